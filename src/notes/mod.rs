//! Note generation from staged video records.
//!
//! Two modes share the same completion client:
//!
//! - **summarize** asks the model to write a summarization prompt tailored to the title and
//!   description, then runs that prompt at temperature 0.
//! - **roast** runs two independent completions over the video's stats and transcript: a
//!   constructive review at 0.5 and a comedy roast at 1.0.

mod completion;
mod markdown;

pub use completion::{CompletionClient, OpenAiCompletion};
pub use markdown::{
    disambiguated_note_filename, format_date, note_filename, render_roast, render_summary,
    sanitize_filename,
};

use crate::config::{NoteMode, Prompts};
use crate::error::Result;
use crate::store::VideoRecord;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const SUMMARY_TEMPERATURE: f32 = 0.0;
const CONSTRUCTIVE_TEMPERATURE: f32 = 0.5;
const ROAST_TEMPERATURE: f32 = 1.0;

const PREVIEW_CHARS: usize = 50;

/// Structured answer of the prompt-construction step.
#[derive(Debug, Deserialize)]
struct GeneratedPrompt {
    #[serde(default)]
    reasoning: Option<String>,
    summarization_prompt: String,
}

/// Produces markdown notes from video records.
pub struct NoteGenerator {
    client: Arc<dyn CompletionClient>,
    prompts: Prompts,
    include_transcript: bool,
}

impl NoteGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            prompts: Prompts::default(),
            include_transcript: false,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Append the raw transcript to summarize-mode notes.
    pub fn with_transcript(mut self, include: bool) -> Self {
        self.include_transcript = include;
        self
    }

    /// Render the note for `record` in the given mode.
    #[instrument(skip(self, record), fields(video_id = %record.video_id))]
    pub async fn generate(&self, record: &VideoRecord, mode: NoteMode) -> Result<String> {
        match mode {
            NoteMode::Summarize => self.summarize(record).await,
            NoteMode::Roast => self.roast(record).await,
        }
    }

    async fn summarize(&self, record: &VideoRecord) -> Result<String> {
        info!("Processing transcript for {}", record.title);

        let instruction = self.summarization_prompt(record).await?;
        info!("Generated summary prompt: {}", preview(&instruction, 200));

        let summary = self
            .client
            .complete(
                &self.prompts.summarize.assistant_system,
                &instruction,
                SUMMARY_TEMPERATURE,
            )
            .await?;
        info!("Summary: {}...", preview(&summary, PREVIEW_CHARS));

        Ok(render_summary(
            record,
            &summary,
            Utc::now(),
            self.include_transcript,
        ))
    }

    /// Ask the model for a summarization prompt specific to this video.
    async fn summarization_prompt(&self, record: &VideoRecord) -> Result<String> {
        let vars = record_vars(record);
        let system = self
            .prompts
            .render_with_custom(&self.prompts.summarize.generator_system, &vars);
        let user = self
            .prompts
            .render_with_custom(&self.prompts.summarize.generator_user, &vars);

        let answer = self.client.complete(&system, &user, SUMMARY_TEMPERATURE).await?;
        Ok(parse_generated_prompt(&answer))
    }

    async fn roast(&self, record: &VideoRecord) -> Result<String> {
        let mut vars = record_vars(record);
        let context = self
            .prompts
            .render_with_custom(&self.prompts.roast.context, &vars);
        vars.insert("context".to_string(), context);

        let system = &self.prompts.summarize.assistant_system;

        let constructive_prompt = self
            .prompts
            .render_with_custom(&self.prompts.roast.constructive, &vars);
        let constructive = self
            .client
            .complete(system, &constructive_prompt, CONSTRUCTIVE_TEMPERATURE)
            .await?;
        info!("Constructive feedback: {}...", preview(&constructive, PREVIEW_CHARS));

        let roast_prompt = self.prompts.render_with_custom(&self.prompts.roast.roast, &vars);
        let roast = self
            .client
            .complete(system, &roast_prompt, ROAST_TEMPERATURE)
            .await?;
        info!("Roast: {}...", preview(&roast, PREVIEW_CHARS));

        Ok(render_roast(record, &constructive, &roast, Utc::now()))
    }
}

fn record_vars(record: &VideoRecord) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("title".to_string(), record.title.clone());
    vars.insert("description".to_string(), record.description.clone());
    vars.insert("channel_name".to_string(), record.channel_name.clone());
    vars.insert("view_count".to_string(), record.view_count.clone());
    vars.insert("like_count".to_string(), record.like_count.clone());
    vars.insert("comment_count".to_string(), record.comment_count.clone());
    vars.insert("duration".to_string(), record.duration.clone());
    vars.insert("transcript".to_string(), record.transcript.clone());
    vars
}

/// Pull `summarization_prompt` out of the model's answer.
///
/// Tolerates prose or code fences around the JSON object; falls back to the whole answer.
fn parse_generated_prompt(answer: &str) -> String {
    let json_str = match (answer.find('{'), answer.rfind('}')) {
        (Some(start), Some(end)) if end > start => &answer[start..=end],
        _ => answer,
    };

    match serde_json::from_str::<GeneratedPrompt>(json_str) {
        Ok(generated) if !generated.summarization_prompt.trim().is_empty() => {
            if let Some(reasoning) = &generated.reasoning {
                debug!("Prompt reasoning: {}", preview(reasoning, 500));
            }
            generated.summarization_prompt
        }
        _ => answer.trim().to_string(),
    }
}

/// First `max` characters on one line.
fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().replace('\n', " ")
}
