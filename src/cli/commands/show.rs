//! Show command implementation.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::open_store;
use anyhow::{bail, Context, Result};
use uuid::Uuid;

/// Print one session in full.
pub async fn run_show(session_id: &str, settings: Settings) -> Result<()> {
    let id = Uuid::parse_str(session_id.trim())
        .with_context(|| format!("Invalid session ID: {}", session_id))?;

    let store = open_store(&settings)?;
    let Some(session) = store.get(&id).await? else {
        bail!("Session not found: {}", id);
    };

    Output::header(&format!("Session {}", session.id));
    Output::kv("Owner", session.owner.as_deref().unwrap_or("anonymous"));
    Output::kv("Created", &session.created_at.to_rfc3339());
    Output::kv("Updated", &session.updated_at.to_rfc3339());
    Output::kv("Transcription calls", &session.transcription_calls.to_string());
    Output::kv("Audio received", &format_size(session.accumulated_bytes));

    if session.transcript.is_empty() {
        Output::section("Transcript", "(empty)");
    } else {
        Output::section("Transcript", &session.transcript);
    }

    if let Some(summary) = &session.summary {
        let title = format!(
            "Summary ({}, {})",
            session.summary_type.as_deref().unwrap_or("medium"),
            session.summary_language.as_deref().unwrap_or("en")
        );
        Output::section(&title, summary);
    }

    if let Some(translation) = &session.translation {
        let title = format!(
            "Translation ({})",
            session.translation_language.as_deref().unwrap_or("?")
        );
        Output::section(&title, translation);
    }

    println!();
    Ok(())
}
