//! Configuration settings for tubenotes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub notes: NoteSettings,
    pub http: HttpSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Root under which `experiments/youtube/transcripts/` is staged.
    pub base_dir: String,
    /// Directory receiving the generated markdown notes.
    pub output_dir: String,
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            output_dir: "~/notes/youtube".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Playlist used as the ingestion queue.
    pub playlist_id: Option<String>,
    /// Data API key, only used for read-only calls when no OAuth files exist.
    pub api_key: Option<String>,
    /// OAuth client secrets ("installed" application format).
    pub client_secrets_path: String,
    /// Cached refreshable credential.
    pub token_path: String,
    /// Loopback port for the consent redirect.
    pub oauth_port: u16,
    /// Preferred caption language.
    pub caption_language: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            playlist_id: None,
            api_key: None,
            client_secrets_path: "client_secrets.json".to_string(),
            token_path: "token.json".to_string(),
            oauth_port: 8000,
            caption_language: "en".to_string(),
        }
    }
}

/// Semantic search (Exa) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Number of results requested when `--num` is not given.
    pub default_count: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.exa.ai".to_string(),
            default_count: 5,
        }
    }
}

/// Completion service settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "mixtral-8x7b-32768".to_string(),
        }
    }
}

/// Note generation mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoteMode {
    /// Prompt-generation step followed by a summary, with frontmatter.
    #[default]
    Summarize,
    /// Constructive feedback plus a comedic roast.
    Roast,
}

impl std::str::FromStr for NoteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summarize" | "summary" => Ok(NoteMode::Summarize),
            "roast" => Ok(NoteMode::Roast),
            _ => Err(format!("Unknown note mode: {}", s)),
        }
    }
}

impl std::fmt::Display for NoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteMode::Summarize => write!(f, "summarize"),
            NoteMode::Roast => write!(f, "roast"),
        }
    }
}

/// Note rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct NoteSettings {
    /// Mode used by the draining pass when `--mode` is not given.
    pub mode: NoteMode,
    /// Append the raw transcript to summarize-mode notes.
    pub include_transcript: bool,
    /// Channel whose latest upload `--roast-channel` ingests.
    pub roast_channel_id: Option<String>,
}

/// HTTP client settings shared by every API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables are applied on top of the file contents.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override file values with environment variables.
    ///
    /// Takes a lookup function so tests don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("EXA_API_KEY") {
            self.search.api_key = Some(v);
        }
        if let Some(v) = get("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(v);
        }
        if let Some(v) = get("YOUTUBE_PLAYLIST_ID") {
            self.youtube.playlist_id = Some(v);
        }
        if let Some(v) = get("GROQ_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.general.output_dir = v;
        }
        if let Some(v) = get("ROAST_CHANNEL_ID") {
            self.notes.roast_channel_id = Some(v);
        }
        if let Some(v) = get("TUBENOTES_BASE_DIR") {
            self.general.base_dir = v;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TubenotesError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubenotes")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded staging root.
    pub fn base_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.base_dir)
    }

    /// Get the expanded note output directory.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    pub fn client_secrets_path(&self) -> PathBuf {
        Self::expand_path(&self.youtube.client_secrets_path)
    }

    pub fn token_path(&self) -> PathBuf {
        Self::expand_path(&self.youtube.token_path)
    }

    /// Request timeout shared by every HTTP client.
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs)
    }
}
