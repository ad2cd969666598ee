//! Error types for tubenotes.

use thiserror::Error;

/// Library-level error type for tubenotes operations.
#[derive(Error, Debug)]
pub enum TubenotesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Search API error: {0}")]
    Search(String),

    #[error("YouTube API error: {0}")]
    YouTube(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Transcript unavailable: {0}")]
    Transcript(String),

    #[error("Completion API error: {0}")]
    Completion(String),

    #[error("Transcript store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for tubenotes operations.
pub type Result<T> = std::result::Result<T, TubenotesError>;
