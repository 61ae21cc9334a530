//! CLI module for voxnote.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// voxnote - recording sessions with live transcription, summaries and translation
///
/// Serves a REST and JSON-RPC API that accumulates transcripts from uploaded
/// audio chunks and generates summaries or translations on demand.
#[derive(Parser, Debug)]
#[command(name = "voxnote")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create data directories and a default configuration file
    Init,

    /// Check API keys, directories and configuration
    Doctor,

    /// Start the HTTP server (REST API and POST /rpc)
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Serve JSON-RPC over stdio, one request per line
    Rpc,

    /// List recorded sessions
    List {
        /// Only show sessions owned by this user
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a session's transcript, summary and translation
    Show {
        /// Session ID
        session_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
