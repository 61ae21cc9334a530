//! Configuration module for Voxnote.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts, TranslationPrompts};
pub use settings::{
    GeneralSettings, LlmSettings, PromptSettings, ServerSettings, SessionSettings, Settings,
    StoreProvider, StoreSettings, TranscriptionSettings, DEEPGRAM_API_KEY_ENV, OPENAI_API_KEY_ENV,
};
