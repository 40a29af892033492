//! Configuration module for subtrans.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, TranslationPrompts};
pub use settings::{
    ChunkingSettings, ExportSettings, FetchSettings, GeneralSettings, IndexSettings,
    InputSettings, PromptSettings, ServeSettings, Settings, StoreSettings, TranslationSettings,
};
