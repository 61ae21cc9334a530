//! voxnote - recording sessions with live transcription
//!
//! A browser records speech and uploads it in chunks. Each chunk is sent to
//! Deepgram and the returned text is appended to the session transcript. On
//! request, an OpenAI-compatible chat model summarizes or translates the
//! accumulated transcript.
//!
//! # Architecture
//!
//! - `provider` - Deepgram speech-to-text and chat-completion adapters
//! - `prompt` - Summary and translation prompt assembly
//! - `store` - Session persistence (in-memory or SQLite)
//! - `service` - Session operations shared by both transports
//! - `api` - REST transport (multipart chunk uploads)
//! - `rpc` - JSON-RPC 2.0 transport over HTTP and stdio
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use voxnote::config::Settings;
//! use voxnote::service::SessionService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let service = SessionService::from_settings(&settings)?;
//!
//!     let id = service.start_session(None).await?;
//!     let audio = std::fs::read("chunk-1.webm")?;
//!     let chunk = service.upload_chunk(&id.to_string(), "1", &audio).await?;
//!     println!("Transcript so far: {}", chunk.complete_text);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod rpc;
pub mod service;
pub mod session;
pub mod store;

pub use error::{Result, VoxnoteError};
