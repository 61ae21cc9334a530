//! Provider adapters for speech-to-text and text generation.
//!
//! Both adapters report failure as `None`: callers decide whether a missing
//! result is an error.

mod deepgram;
mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use deepgram::DeepgramTranscriber;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for speech-to-text services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one chunk of encoded audio.
    ///
    /// Returns the trimmed transcript, or `None` if nothing usable came back.
    async fn transcribe(&self, audio: &[u8]) -> Option<String>;
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged prompt message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for LLM text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the messages and return the first response's text content.
    async fn generate(&self, messages: &[ChatMessage]) -> Option<String>;
}
