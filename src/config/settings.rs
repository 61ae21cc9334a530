//! Configuration settings for Voxnote.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Deepgram credential.
pub const DEEPGRAM_API_KEY_ENV: &str = "DEEPGRAM_API_KEY";

/// Environment variable holding the OpenAI credential.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub llm: LlmSettings,
    pub store: StoreSettings,
    pub session: SessionSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.voxnote".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin (browser recorders).
    pub cors: bool,
    /// Upper bound for a single uploaded request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: true,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Speech-to-text (Deepgram) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// API key; falls back to the `DEEPGRAM_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Base URL of the Deepgram API.
    pub base_url: String,
    pub model: String,
    pub language: String,
    pub smart_format: bool,
    pub punctuate: bool,
    pub diarize: bool,
    /// MIME type sent with each chunk.
    pub content_type: String,
    /// Chunks smaller than this are treated as silent or corrupt.
    pub min_audio_bytes: usize,
    pub timeout_secs: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepgram.com".to_string(),
            model: "nova-2".to_string(),
            language: "en".to_string(),
            smart_format: true,
            punctuate: true,
            diarize: false,
            content_type: "audio/webm".to_string(),
            min_audio_bytes: 1000,
            timeout_secs: 60,
        }
    }
}

impl TranscriptionSettings {
    /// Resolve the API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(DEEPGRAM_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// LLM (chat completion) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    /// Override for OpenAI-compatible endpoints.
    pub api_base: Option<String>,
    /// API key; falls back to the `OPENAI_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key: None,
            temperature: 0.3,
            timeout_secs: 300,
        }
    }
}

/// Session store backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Durable SQLite database (default).
    #[default]
    Sqlite,
    /// Process-local map, lost on restart.
    Memory,
}

impl std::str::FromStr for StoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "db" => Ok(StoreProvider::Sqlite),
            "memory" | "mem" => Ok(StoreProvider::Memory),
            _ => Err(format!("Unknown store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Sqlite => write!(f, "sqlite"),
            StoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub provider: StoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sqlite,
            sqlite_path: "~/.voxnote/sessions.db".to_string(),
        }
    }
}

/// Preconditions applied by the session service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Minimum trimmed transcript length before a summary may be requested.
    pub min_summary_chars: usize,
    /// Minimum trimmed transcript length before a translation may be requested.
    pub min_translation_chars: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_summary_chars: 50,
            min_translation_chars: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VoxnoteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxnote")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcription.model, "nova-2");
        assert_eq!(settings.transcription.min_audio_bytes, 1000);
        assert_eq!(settings.session.min_summary_chars, 50);
        assert_eq!(settings.session.min_translation_chars, 10);
        assert_eq!(settings.store.provider, StoreProvider::Sqlite);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [store]
            provider = "memory"

            [session]
            min_summary_chars = 20
            "#,
        )
        .unwrap();

        assert_eq!(settings.store.provider, StoreProvider::Memory);
        assert_eq!(settings.session.min_summary_chars, 20);
        assert_eq!(settings.session.min_translation_chars, 10);
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.llm.model = "gpt-4.1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.model, "gpt-4.1");
    }

    #[test]
    fn test_store_provider_from_str() {
        assert_eq!("SQLite".parse::<StoreProvider>().unwrap(), StoreProvider::Sqlite);
        assert_eq!("memory".parse::<StoreProvider>().unwrap(), StoreProvider::Memory);
        assert!("redis".parse::<StoreProvider>().is_err());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let settings = TranscriptionSettings {
            api_key: Some("dg-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key().as_deref(), Some("dg-secret"));

        let blank = TranscriptionSettings {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.resolve_api_key().is_none());
    }
}
