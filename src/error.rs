//! Error types for Voxnote.

use thiserror::Error;

/// Library-level error type for Voxnote operations.
#[derive(Error, Debug)]
pub enum VoxnoteError {
    #[error("Invalid session ID: {0}")]
    InvalidSession(String),

    #[error("Transcript too short for {operation} (need at least {required} characters, have {actual})")]
    TranscriptTooShort {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Failed to generate summary")]
    SummaryGenerationFailed,

    #[error("Failed to translate text")]
    TranslationFailed,

    #[error("Provider call failed: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid base64 audio data: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl VoxnoteError {
    /// Stable name of the error variant, exposed to transport clients.
    pub fn kind(&self) -> &'static str {
        match self {
            VoxnoteError::InvalidSession(_) => "InvalidSession",
            VoxnoteError::TranscriptTooShort { .. } => "TranscriptTooShort",
            VoxnoteError::SummaryGenerationFailed => "SummaryGenerationFailed",
            VoxnoteError::TranslationFailed => "TranslationFailed",
            VoxnoteError::Provider(_) => "ProviderCallFailed",
            VoxnoteError::Config(_) => "Config",
            VoxnoteError::Store(_) => "Store",
            VoxnoteError::InvalidInput(_) | VoxnoteError::Base64(_) => "InvalidInput",
            VoxnoteError::Io(_) => "Io",
            VoxnoteError::Json(_) => "Json",
            VoxnoteError::TomlParse(_) => "TomlParse",
            VoxnoteError::Http(_) => "Http",
            VoxnoteError::Database(_) => "Database",
        }
    }

    /// Whether the error was caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VoxnoteError::InvalidSession(_)
                | VoxnoteError::TranscriptTooShort { .. }
                | VoxnoteError::InvalidInput(_)
                | VoxnoteError::Base64(_)
        )
    }
}

/// Result type alias for Voxnote operations.
pub type Result<T> = std::result::Result<T, VoxnoteError>;
