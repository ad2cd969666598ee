//! Prompt templates for tubenotes.
//!
//! Prompts can be customized by placing a `notes.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summarize: SummarizePrompts,
    pub roast: RoastPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for summarize mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizePrompts {
    /// Shared system message for plain completions.
    pub assistant_system: String,
    /// System message for the prompt-construction step.
    pub generator_system: String,
    /// User message for the prompt-construction step.
    pub generator_user: String,
}

impl Default for SummarizePrompts {
    fn default() -> Self {
        Self {
            assistant_system: "You are a helpful assistant.".to_string(),

            generator_system: r#"Given the title and description of a YouTube video, generate a summarization prompt to be used with an AI assistant. The prompt should be specific to the video title and description, and aim to provide an engaging and informative summary of the video's content. Make the prompt easy to understand and follow, avoid technical jargon and complex language, and remember that the goal is a prompt that lets the AI create the best possible summary of the video, packed with key takeaways and useful insights. If the video is about crypto, include instructions to extract the tokens to buy or sell and why.

Think step by step before answering.

Respond with a JSON object:
{"reasoning": "<your step-by-step thinking>", "summarization_prompt": "<the prompt>"}"#
                .to_string(),

            generator_user: r#"Title: {{title}}

Description:
{{description}}"#
                .to_string(),
        }
    }
}

/// Prompts for roast mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoastPrompts {
    /// Stats and transcript block shared by both completions.
    pub context: String,
    pub constructive: String,
    pub roast: String,
}

impl Default for RoastPrompts {
    fn default() -> Self {
        Self {
            context: r#"Video views: {{view_count}}
Likes: {{like_count}}
Comments: {{comment_count}}
Duration: {{duration}}
Transcript:
{{transcript}}"#
                .to_string(),

            constructive: r#"You are a professional YouTuber and esteemed podcast host. Two aspiring podcasters have given you a podcast transcript from their latest episode: {{title}}, and you have been tasked with giving constructive feedback. They are seeking actionable advice on how to improve the podcast. From growth tips like YouTube SEO, to delivery and content, nothing is off the table. What went well, what could improve: they want any and all feedback to improve their skills and final product. Format all responses as markdown, and remember to be constructive and positive!

{{context}}"#
                .to_string(),

            roast: r#"You're a witty comedian at a roast battle. Two aspiring podcasters have given you a podcast transcript from their latest episode: {{title}}, and your job is to roast them. Comedy Central style. Don't be afraid to give 'em a good ROAST!

Remember to:
1. Keep it clever and creative - puns and wordplay are your friends.
2. Focus on their content and delivery, not personal attacks.
3. Mix in some backhanded compliments for extra laughs.
4. Reference specific moments or quotes from the transcript if possible.
5. End with a light-hearted encouragement to keep improving.

Use this info to fuel your roast:
{{context}}"#
                .to_string(),
        }
    }
}

/// On-disk override file layout.
#[derive(Debug, Deserialize)]
struct NotePromptFile {
    summarize: Option<SummarizePrompts>,
    roast: Option<RoastPrompts>,
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let notes_path = custom_path.join("notes.toml");
            if notes_path.exists() {
                let content = std::fs::read_to_string(&notes_path)?;
                let file: NotePromptFile = toml::from_str(&content)?;
                if let Some(summarize) = file.summarize {
                    prompts.summarize = summarize;
                }
                if let Some(roast) = file.roast {
                    prompts.roast = roast;
                }
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.summarize.generator_system.contains("summarization_prompt"));
        assert!(prompts.roast.constructive.contains("{{context}}"));
        assert!(prompts.roast.roast.contains("{{title}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_win_over_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("host".to_string(), "config".to_string());
        prompts.variables.insert("show".to_string(), "The Show".to_string());

        let mut vars = HashMap::new();
        vars.insert("host".to_string(), "call".to_string());

        let result = prompts.render_with_custom("{{host}} on {{show}}", &vars);
        assert_eq!(result, "call on The Show");
    }

    #[test]
    fn test_load_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("notes.toml"),
            r#"
            [roast]
            roast = "Roast {{title}} gently."
            "#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.roast.roast, "Roast {{title}} gently.");
        // Fields missing from the file keep their defaults
        assert!(prompts.roast.constructive.contains("constructive"));
        assert_eq!(prompts.summarize.assistant_system, "You are a helpful assistant.");
    }
}
