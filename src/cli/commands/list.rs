//! List command implementation.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::open_store;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(owner: Option<String>, settings: Settings) -> Result<()> {
    let store = open_store(&settings)?;

    match store.list(owner.as_deref()).await {
        Ok(sessions) => {
            if sessions.is_empty() {
                Output::info("No sessions recorded yet. Start one with 'voxnote serve'.");
            } else {
                Output::header(&format!("Sessions ({})", sessions.len()));
                println!();

                for session in &sessions {
                    Output::session_line(session);
                }

                let total_bytes: u64 = sessions.iter().map(|s| s.accumulated_bytes).sum();
                let total_calls: u64 = sessions.iter().map(|s| s.transcription_calls).sum();
                println!();
                Output::kv("Total sessions", &sessions.len().to_string());
                Output::kv("Transcription calls", &total_calls.to_string());
                Output::kv("Audio received", &format_size(total_bytes));
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list sessions: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
