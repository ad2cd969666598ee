//! Configuration module for tubenotes.
//!
//! Handles loading application settings (TOML file plus environment) and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RoastPrompts, SummarizePrompts};
pub use settings::{
    GeneralSettings, HttpSettings, LlmSettings, NoteMode, NoteSettings, PromptSettings,
    SearchSettings, Settings, YoutubeSettings,
};
