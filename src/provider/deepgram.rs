//! Deepgram pre-recorded transcription adapter.

use super::Transcriber;
use crate::config::TranscriptionSettings;
use crate::error::{Result, VoxnoteError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Speech-to-text over Deepgram's `/v1/listen` endpoint.
pub struct DeepgramTranscriber {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: Url,
    content_type: String,
    min_audio_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    results: Option<ListenResults>,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Default, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Default, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: Option<String>,
}

impl ListenResponse {
    /// Transcript of the first alternative of the first channel, if non-empty.
    fn first_transcript(self) -> Option<String> {
        self.results?
            .channels
            .into_iter()
            .next()?
            .alternatives
            .into_iter()
            .next()?
            .transcript
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

impl DeepgramTranscriber {
    /// Create a transcriber from settings, resolving the API key from the
    /// config file or the environment.
    pub fn from_settings(settings: &TranscriptionSettings) -> Result<Self> {
        let base = settings.base_url.trim_end_matches('/');
        let mut endpoint = Url::parse(&format!("{}/v1/listen", base))
            .map_err(|e| VoxnoteError::Config(format!("Invalid Deepgram base URL '{}': {}", base, e)))?;

        endpoint
            .query_pairs_mut()
            .append_pair("model", &settings.model)
            .append_pair("smart_format", &settings.smart_format.to_string())
            .append_pair("language", &settings.language)
            .append_pair("punctuate", &settings.punctuate.to_string())
            .append_pair("diarize", &settings.diarize.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: settings.resolve_api_key(),
            endpoint,
            content_type: settings.content_type.clone(),
            min_audio_bytes: settings.min_audio_bytes,
        })
    }

    /// Whether a credential is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request(&self, api_key: &str, audio: &[u8]) -> Result<Option<String>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Token {}", api_key))
            .header(CONTENT_TYPE, &self.content_type)
            .body(audio.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Deepgram returned status {}", status);
            return Ok(None);
        }

        let body: ListenResponse = response.json().await?;
        Ok(body.first_transcript())
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8]) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Deepgram API key not configured");
            return None;
        };

        if audio.len() < self.min_audio_bytes {
            warn!(
                "Audio data too small: {} bytes (minimum {})",
                audio.len(),
                self.min_audio_bytes
            );
            return None;
        }

        match self.request(api_key, audio).await {
            Ok(Some(transcript)) => {
                let preview: String = transcript.chars().take(50).collect();
                info!(
                    "Transcribed {} bytes into {} chars: {}...",
                    audio.len(),
                    transcript.chars().count(),
                    preview
                );
                Some(transcript)
            }
            Ok(None) => {
                debug!("No transcript in Deepgram response");
                None
            }
            Err(e) => {
                error!("Deepgram request failed: {}", e);
                None
            }
        }
    }
}
