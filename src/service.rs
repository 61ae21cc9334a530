//! Session service: the single implementation behind every transport.
//!
//! Coordinates the store, the speech-to-text adapter, the prompt builder and
//! the text generator. Mutations of one session are serialized so concurrent
//! chunk uploads cannot interleave or lose fragments.

use crate::config::{Prompts, SessionSettings, Settings};
use crate::error::{Result, VoxnoteError};
use crate::prompt::{PromptBuilder, SummaryType};
use crate::provider::{ChatMessage, DeepgramTranscriber, OpenAiGenerator, TextGenerator, Transcriber};
use crate::session::Session;
use crate::store::{open_store, SessionStore};
use base64::Engine;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Outcome of one chunk upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChunkResult {
    pub chunk_number: String,
    /// This chunk's transcription, empty if nothing was recognised.
    pub transcription: String,
    /// Full transcript after this chunk.
    pub complete_text: String,
    pub transcription_calls: u64,
    pub accumulated_bytes: u64,
}

/// Final state reported when a recording stops.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StopResult {
    pub complete_text: String,
    /// Chunks are not counted server-side; always 0.
    pub total_chunks: u64,
    pub transcription_calls: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryResult {
    pub summary: String,
    pub summary_type: String,
    pub original_text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranslationResult {
    pub translation: String,
    pub target_language: String,
}

/// Orchestrates session lifecycle, transcription, summaries and translation.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn TextGenerator>,
    prompts: PromptBuilder,
    limits: SessionSettings,
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn TextGenerator>,
        prompts: PromptBuilder,
        limits: SessionSettings,
    ) -> Self {
        Self {
            store,
            transcriber,
            generator,
            prompts,
            limits,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wire up the configured store and providers.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber = DeepgramTranscriber::from_settings(&settings.transcription)?;
        if !transcriber.is_configured() {
            warn!("No Deepgram API key configured; chunks will not be transcribed");
        }

        let generator = OpenAiGenerator::from_settings(&settings.llm)?;
        let store = open_store(settings)?;

        info!(
            "Session service ready (store: {}, model: {})",
            settings.store.provider, settings.llm.model
        );

        Ok(Self::new(
            store,
            Arc::new(transcriber),
            Arc::new(generator),
            PromptBuilder::new(prompts),
            settings.session.clone(),
        ))
    }

    /// Create a new empty session and return its identifier.
    #[instrument(skip(self))]
    pub async fn start_session(&self, owner: Option<String>) -> Result<Uuid> {
        let session = Session::new(owner);
        self.store.create(&session).await?;
        info!("Session started: {}", session.id);
        Ok(session.id)
    }

    /// Transcribe a chunk and append its text to the session transcript.
    ///
    /// A failed transcription is not an error: it yields an empty fragment and
    /// leaves the transcript unchanged.
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn upload_chunk(
        &self,
        session_id: &str,
        chunk_number: &str,
        audio: &[u8],
    ) -> Result<ChunkResult> {
        let id = parse_session_id(session_id)?;
        let _guard = self.lock_session(id).await?;

        let mut session = self.load(&id).await?;
        info!(
            "Session {}, chunk {}: {} bytes",
            id,
            chunk_number,
            audio.len()
        );

        let fragment = self.transcriber.transcribe(audio).await;
        let transcription = session.record_chunk(audio.len(), fragment.as_deref());
        self.store.update(&session).await?;

        if !transcription.is_empty() {
            info!(
                "Transcription call #{}: {} chars",
                session.transcription_calls,
                transcription.chars().count()
            );
        }

        Ok(ChunkResult {
            chunk_number: chunk_number.to_string(),
            transcription,
            complete_text: session.transcript,
            transcription_calls: session.transcription_calls,
            accumulated_bytes: session.accumulated_bytes,
        })
    }

    /// Decode a base64 chunk, then upload it.
    pub async fn upload_chunk_base64(
        &self,
        session_id: &str,
        chunk_number: &str,
        audio_base64: &str,
    ) -> Result<ChunkResult> {
        let audio = base64::engine::general_purpose::STANDARD.decode(audio_base64.trim())?;
        self.upload_chunk(session_id, chunk_number, &audio).await
    }

    /// Report the session's final transcript and counters.
    #[instrument(skip(self))]
    pub async fn stop_session(&self, session_id: &str) -> Result<StopResult> {
        let id = parse_session_id(session_id)?;
        let session = self.load(&id).await?;
        info!("Session stopped: {}", id);

        Ok(StopResult {
            complete_text: session.transcript,
            total_chunks: 0,
            transcription_calls: session.transcription_calls,
            total_bytes: session.accumulated_bytes,
        })
    }

    /// Summarize the session transcript and store the summary.
    #[instrument(skip(self))]
    pub async fn generate_summary(
        &self,
        session_id: &str,
        summary_type: &str,
        language: &str,
    ) -> Result<SummaryResult> {
        let id = parse_session_id(session_id)?;
        let _guard = self.lock_session(id).await?;

        let mut session = self.load(&id).await?;
        self.require_length(&session, self.limits.min_summary_chars, "summary generation")?;

        info!("Generating {} summary for session {}", summary_type, id);

        let prompt = self.prompts.build_summary_prompt(
            SummaryType::parse_lenient(summary_type),
            &session.transcript,
            language,
        );

        let summary = self
            .generator
            .generate(&[ChatMessage::user(prompt)])
            .await
            .ok_or(VoxnoteError::SummaryGenerationFailed)?;

        info!("Generated {} summary: {} chars", summary_type, summary.chars().count());

        session.set_summary(summary.clone(), summary_type, language);
        self.store.update(&session).await?;

        Ok(SummaryResult {
            summary,
            summary_type: summary_type.to_string(),
            original_text: session.transcript,
        })
    }

    /// Translate the session transcript, continuing from the previous
    /// translation when there is one.
    #[instrument(skip(self))]
    pub async fn translate(&self, session_id: &str, target_language: &str) -> Result<TranslationResult> {
        let id = parse_session_id(session_id)?;
        let _guard = self.lock_session(id).await?;

        let mut session = self.load(&id).await?;
        self.require_length(&session, self.limits.min_translation_chars, "translation")?;

        info!("Translating session {} to {}", id, target_language);

        let prompt = self.prompts.build_translation_prompt(
            &session.transcript,
            target_language,
            session.translation.as_deref(),
        );

        let translation = self
            .generator
            .generate(&[ChatMessage::user(prompt)])
            .await
            .ok_or(VoxnoteError::TranslationFailed)?;

        session.set_translation(translation.clone(), target_language);
        self.store.update(&session).await?;

        Ok(TranslationResult {
            translation,
            target_language: target_language.to_string(),
        })
    }

    /// Fetch the full session record.
    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let id = parse_session_id(session_id)?;
        self.load(&id).await
    }

    /// List sessions, newest first.
    pub async fn list_sessions(&self, owner: Option<&str>) -> Result<Vec<Session>> {
        self.store.list(owner).await
    }

    async fn load(&self, id: &Uuid) -> Result<Session> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| VoxnoteError::InvalidSession(id.to_string()))
    }

    fn require_length(&self, session: &Session, required: usize, operation: &'static str) -> Result<()> {
        let actual = session.transcript_len();
        if actual < required {
            return Err(VoxnoteError::TranscriptTooShort {
                operation,
                required,
                actual,
            });
        }
        Ok(())
    }

    /// Acquire the exclusive mutation lock for one session.
    async fn lock_session(&self, id: Uuid) -> Result<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| VoxnoteError::Store(format!("Failed to acquire lock: {}", e)))?;
            // Drop locks nobody is holding or waiting on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }
}

fn parse_session_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| VoxnoteError::InvalidSession(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{RecordingGenerator, ScriptedTranscriber};
    use crate::store::MemorySessionStore;
    use std::time::Duration;

    fn service(
        transcriber: ScriptedTranscriber,
        generator: Arc<RecordingGenerator>,
    ) -> SessionService {
        SessionService::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(transcriber),
            generator,
            PromptBuilder::default(),
            SessionSettings::default(),
        )
    }

    const LONG_TEXT: &str =
        "the quarterly review covered revenue growth hiring plans and the new product launch timeline";

    #[tokio::test]
    async fn test_record_and_stop_scenario() {
        let svc = service(
            ScriptedTranscriber::new(vec![Some("hello world"), Some("how are you")]),
            Arc::new(RecordingGenerator::new(None)),
        );

        let id = svc.start_session(None).await.unwrap().to_string();

        let a = svc.upload_chunk(&id, "1", &vec![0u8; 15_000]).await.unwrap();
        assert_eq!(a.chunk_number, "1");
        assert_eq!(a.transcription, "hello world");
        assert_eq!(a.complete_text, "hello world");

        let b = svc.upload_chunk(&id, "2", &vec![0u8; 15_000]).await.unwrap();
        assert_eq!(b.transcription, "how are you");
        assert_eq!(b.complete_text, "hello world how are you");

        let stop = svc.stop_session(&id).await.unwrap();
        assert_eq!(stop.complete_text, "hello world how are you");
        assert_eq!(stop.transcription_calls, 2);
        assert_eq!(stop.total_bytes, 30_000);
        assert_eq!(stop.total_chunks, 0);
    }

    #[tokio::test]
    async fn test_failed_transcription_keeps_transcript() {
        let svc = service(
            ScriptedTranscriber::new(vec![Some("first part"), None, Some("last part")]),
            Arc::new(RecordingGenerator::new(None)),
        );
        let id = svc.start_session(None).await.unwrap().to_string();

        svc.upload_chunk(&id, "1", &[1u8; 4_000]).await.unwrap();
        let silent = svc.upload_chunk(&id, "2", &[1u8; 6_000]).await.unwrap();
        assert_eq!(silent.transcription, "");
        assert_eq!(silent.complete_text, "first part");
        assert_eq!(silent.transcription_calls, 1);
        assert_eq!(silent.accumulated_bytes, 10_000);

        let last = svc.upload_chunk(&id, "3", &[1u8; 2_000]).await.unwrap();
        assert_eq!(last.complete_text, "first part last part");
        assert_eq!(last.transcription_calls, 2);
        assert_eq!(last.accumulated_bytes, 12_000);
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let svc = service(
            ScriptedTranscriber::new(vec![]),
            Arc::new(RecordingGenerator::new(Some("x"))),
        );

        let unknown = Uuid::new_v4().to_string();
        for result in [
            svc.upload_chunk(&unknown, "1", &[0u8; 2_000]).await.map(|_| ()),
            svc.upload_chunk("not-a-uuid", "1", &[0u8; 2_000]).await.map(|_| ()),
            svc.stop_session(&unknown).await.map(|_| ()),
            svc.generate_summary(&unknown, "short", "en").await.map(|_| ()),
            svc.translate(&unknown, "es").await.map(|_| ()),
            svc.get_session(&unknown).await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(VoxnoteError::InvalidSession(_))));
        }
    }

    #[tokio::test]
    async fn test_summary_requires_long_transcript() {
        let generator = Arc::new(RecordingGenerator::new(Some("summary")));
        let svc = service(ScriptedTranscriber::new(vec![]), generator.clone());
        let id = svc.start_session(None).await.unwrap().to_string();

        let err = svc.generate_summary(&id, "medium", "en").await.unwrap_err();
        assert!(matches!(
            err,
            VoxnoteError::TranscriptTooShort { required: 50, actual: 0, .. }
        ));
        assert_eq!(generator.calls(), 0);
    }

    /// A session whose transcript is `text` after one uploaded chunk.
    async fn session_with_transcript(text: &str, generator: Arc<RecordingGenerator>) -> (SessionService, String) {
        let svc = service(ScriptedTranscriber::new(vec![Some(text)]), generator);
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();
        (svc, id)
    }

    #[tokio::test]
    async fn test_summary_threshold_boundary() {
        let generator = Arc::new(RecordingGenerator::new(Some("summary")));
        let (svc, id) = session_with_transcript(&"a".repeat(49), generator.clone()).await;
        let err = svc.generate_summary(&id, "medium", "en").await.unwrap_err();
        assert!(matches!(
            err,
            VoxnoteError::TranscriptTooShort { required: 50, actual: 49, .. }
        ));
        assert_eq!(generator.calls(), 0);

        let (svc, id) = session_with_transcript(&"a".repeat(50), generator.clone()).await;
        let result = svc.generate_summary(&id, "medium", "en").await.unwrap();
        assert_eq!(result.summary, "summary");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_translation_threshold_boundary() {
        let generator = Arc::new(RecordingGenerator::new(Some("traduit")));
        let (svc, id) = session_with_transcript(&"b".repeat(9), generator.clone()).await;
        let err = svc.translate(&id, "fr").await.unwrap_err();
        assert!(matches!(
            err,
            VoxnoteError::TranscriptTooShort { required: 10, actual: 9, .. }
        ));
        assert_eq!(generator.calls(), 0);

        let (svc, id) = session_with_transcript(&"b".repeat(10), generator.clone()).await;
        let result = svc.translate(&id, "fr").await.unwrap();
        assert_eq!(result.translation, "traduit");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_summary_persists_result() {
        let generator = Arc::new(RecordingGenerator::new(Some("Revenue is up.")));
        let svc = service(ScriptedTranscriber::new(vec![Some(LONG_TEXT)]), generator.clone());
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let result = svc.generate_summary(&id, "short", "ja").await.unwrap();
        assert_eq!(result.summary, "Revenue is up.");
        assert_eq!(result.summary_type, "short");
        assert_eq!(result.original_text, LONG_TEXT);

        let prompt = generator.last_prompt();
        assert!(prompt.contains("日本語で要約してください。"));
        assert!(prompt.contains("exactly 4-5 lines"));
        assert!(prompt.ends_with(LONG_TEXT));

        let session = svc.get_session(&id).await.unwrap();
        assert_eq!(session.summary.as_deref(), Some("Revenue is up."));
        assert_eq!(session.summary_type.as_deref(), Some("short"));
        assert_eq!(session.summary_language.as_deref(), Some("ja"));
    }

    #[tokio::test]
    async fn test_unknown_summary_type_uses_medium_template() {
        let generator = Arc::new(RecordingGenerator::new(Some("ok")));
        let svc = service(ScriptedTranscriber::new(vec![Some(LONG_TEXT)]), generator.clone());
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let result = svc.generate_summary(&id, "haiku", "xx").await.unwrap();
        assert_eq!(result.summary_type, "haiku");

        let prompt = generator.last_prompt();
        assert!(prompt.contains("MEDIUM-length"));
        assert!(prompt.contains("Summarize in English."));
    }

    #[tokio::test]
    async fn test_summary_provider_failure() {
        let generator = Arc::new(RecordingGenerator::new(None));
        let svc = service(ScriptedTranscriber::new(vec![Some(LONG_TEXT)]), generator.clone());
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let err = svc.generate_summary(&id, "medium", "en").await.unwrap_err();
        assert!(matches!(err, VoxnoteError::SummaryGenerationFailed));
        assert!(svc.get_session(&id).await.unwrap().summary.is_none());
    }

    #[tokio::test]
    async fn test_translate_requires_ten_chars() {
        let generator = Arc::new(RecordingGenerator::new(Some("hola")));
        let svc = service(ScriptedTranscriber::new(vec![Some("hi there")]), generator.clone());
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let err = svc.translate(&id, "es").await.unwrap_err();
        assert!(matches!(
            err,
            VoxnoteError::TranscriptTooShort { required: 10, actual: 8, .. }
        ));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_translation_threads_previous_result() {
        let generator = Arc::new(RecordingGenerator::new(Some("Hola a todos")));
        let svc = service(
            ScriptedTranscriber::new(vec![Some("hello everyone")]),
            generator.clone(),
        );
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let first = svc.translate(&id, "es").await.unwrap();
        assert_eq!(first.translation, "Hola a todos");
        assert_eq!(first.target_language, "es");
        assert!(generator.last_prompt().starts_with("Translate the following English text to Spanish."));

        svc.translate(&id, "zz").await.unwrap();
        let prompt = generator.last_prompt();
        assert!(prompt.contains("live speech transcription to Japanese"));
        assert!(prompt.ends_with("Previous translation context: Hola a todos"));

        let session = svc.get_session(&id).await.unwrap();
        assert_eq!(session.translation_language.as_deref(), Some("zz"));
    }

    #[tokio::test]
    async fn test_translation_failure() {
        let svc = service(
            ScriptedTranscriber::new(vec![Some(LONG_TEXT)]),
            Arc::new(RecordingGenerator::new(None)),
        );
        let id = svc.start_session(None).await.unwrap().to_string();
        svc.upload_chunk(&id, "1", &[0u8; 3_000]).await.unwrap();

        let err = svc.translate(&id, "fr").await.unwrap_err();
        assert!(matches!(err, VoxnoteError::TranslationFailed));
    }

    #[tokio::test]
    async fn test_base64_upload() {
        let svc = service(
            ScriptedTranscriber::new(vec![Some("decoded")]),
            Arc::new(RecordingGenerator::new(None)),
        );
        let id = svc.start_session(None).await.unwrap().to_string();

        let encoded = base64::engine::general_purpose::STANDARD.encode(vec![7u8; 1_500]);
        let result = svc.upload_chunk_base64(&id, "1", &encoded).await.unwrap();
        assert_eq!(result.transcription, "decoded");
        assert_eq!(result.accumulated_bytes, 1_500);

        let err = svc.upload_chunk_base64(&id, "2", "***").await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_do_not_lose_fragments() {
        let svc = Arc::new(service(
            ScriptedTranscriber::new(vec![Some("one"), Some("two"), Some("three"), Some("four")])
                .with_delay(Duration::from_millis(10)),
            Arc::new(RecordingGenerator::new(None)),
        ));
        let id = svc.start_session(None).await.unwrap().to_string();

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let svc = svc.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    svc.upload_chunk(&id, &n.to_string(), &[0u8; 2_000]).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stop = svc.stop_session(&id).await.unwrap();
        assert_eq!(stop.transcription_calls, 4);
        assert_eq!(stop.total_bytes, 8_000);
        let mut words: Vec<&str> = stop.complete_text.split(' ').collect();
        words.sort_unstable();
        assert_eq!(words, vec!["four", "one", "three", "two"]);
    }

    #[tokio::test]
    async fn test_list_sessions_by_owner() {
        let svc = service(
            ScriptedTranscriber::new(vec![]),
            Arc::new(RecordingGenerator::new(None)),
        );
        svc.start_session(Some("alice".to_string())).await.unwrap();
        svc.start_session(Some("bob".to_string())).await.unwrap();

        assert_eq!(svc.list_sessions(None).await.unwrap().len(), 2);
        assert_eq!(svc.list_sessions(Some("bob")).await.unwrap().len(), 1);
    }
}
