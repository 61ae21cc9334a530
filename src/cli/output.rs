//! CLI output formatting utilities.

use crate::session::Session;
use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// One-line session summary for listings.
    pub fn session_line(session: &Session) {
        let owner = session.owner.as_deref().unwrap_or("anonymous");
        let mut flags = Vec::new();
        if session.summary.is_some() {
            flags.push("summary");
        }
        if session.translation.is_some() {
            flags.push("translation");
        }

        println!(
            "  {} {} ({}, {}, {} calls, {})",
            style("*").cyan(),
            style(session.id).bold(),
            style(owner).dim(),
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.transcription_calls,
            format_size(session.accumulated_bytes)
        );
        println!("    {}", style(content_preview(&session.transcript, 100)).dim());
        if !flags.is_empty() {
            println!("    {}", style(flags.join(", ")).green());
        }
    }

    /// A titled block of text.
    pub fn section(title: &str, body: &str) {
        println!("\n{}", style(title).bold());
        println!("{}", body);
    }
}

/// Format a byte count in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.is_empty() {
        return "(empty transcript)".to_string();
    }
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
