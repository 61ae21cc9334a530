//! Provider fakes shared by unit tests.

use super::{ChatMessage, TextGenerator, Transcriber};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Returns queued transcripts in order, `None` once exhausted.
pub struct ScriptedTranscriber {
    results: Mutex<VecDeque<Option<String>>>,
    delay: Duration,
}

impl ScriptedTranscriber {
    pub fn new(results: Vec<Option<&str>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().map(|r| r.map(String::from)).collect()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Option<String> {
        let next = self.results.lock().unwrap().pop_front().flatten();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        next
    }
}

/// Records prompts and answers with a fixed reply.
pub struct RecordingGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl RecordingGenerator {
    pub fn new(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(String::from),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = messages.last() {
            self.prompts.lock().unwrap().push(message.content.clone());
        }
        self.reply.clone()
    }
}
