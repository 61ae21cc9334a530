//! Recording session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recording-to-summary workflow, keyed by a UUID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    /// Identity of the caller that started the session, if known.
    pub owner: Option<String>,
    /// Space-joined transcription fragments in arrival order.
    pub transcript: String,
    /// Chunks that produced non-empty text.
    pub transcription_calls: u64,
    /// Raw audio bytes received across all chunks.
    pub accumulated_bytes: u64,
    pub summary: Option<String>,
    pub summary_type: Option<String>,
    pub summary_language: Option<String>,
    pub translation: Option<String>,
    pub translation_language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with a fresh identifier.
    pub fn new(owner: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            transcript: String::new(),
            transcription_calls: 0,
            accumulated_bytes: 0,
            summary: None,
            summary_type: None,
            summary_language: None,
            translation: None,
            translation_language: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a received chunk. `fragment` is the chunk's transcription, if any.
    ///
    /// Returns the fragment that was appended (empty if none).
    pub fn record_chunk(&mut self, byte_len: usize, fragment: Option<&str>) -> String {
        self.accumulated_bytes += byte_len as u64;
        self.updated_at = Utc::now();

        let Some(text) = fragment.map(str::trim).filter(|t| !t.is_empty()) else {
            return String::new();
        };

        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(text);
        self.transcription_calls += 1;
        text.to_string()
    }

    /// Length of the trimmed transcript in characters.
    pub fn transcript_len(&self) -> usize {
        self.transcript.trim().chars().count()
    }

    pub fn set_summary(&mut self, summary: String, summary_type: &str, language: &str) {
        self.summary = Some(summary);
        self.summary_type = Some(summary_type.to_string());
        self.summary_language = Some(language.to_string());
        self.updated_at = Utc::now();
    }

    pub fn set_translation(&mut self, translation: String, language: &str) {
        self.translation = Some(translation);
        self.translation_language = Some(language.to_string());
        self.updated_at = Utc::now();
    }
}
