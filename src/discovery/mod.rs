//! Video discovery through a semantic search API.
//!
//! A natural-language prompt is turned into ranked result URLs, and each URL is reduced
//! to a YouTube video id.

mod exa;

pub use exa::ExaSearch;

use crate::error::{Result, TubenotesError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// A single ranked hit from the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub num_results: usize,
    pub include_text: Option<String>,
    pub exclude_text: Option<String>,
}

/// Trait for semantic search providers.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Run a neural-ranked search and return results in rank order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>>;
}

/// Finds YouTube videos for a prompt.
pub struct VideoDiscoverer {
    search: Arc<dyn VideoSearch>,
}

impl VideoDiscoverer {
    pub fn new(search: Arc<dyn VideoSearch>) -> Self {
        Self { search }
    }

    /// Search for videos matching `prompt`, steering generic prompts towards YouTube.
    #[instrument(skip(self))]
    pub async fn find(
        &self,
        prompt: &str,
        count: usize,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<Vec<SearchResult>> {
        if prompt.trim().is_empty() {
            return Err(TubenotesError::InvalidInput(
                "Discovery prompt is empty".to_string(),
            ));
        }

        let query = rewrite_prompt(prompt);
        info!("Modified prompt: {}", query);

        self.search
            .search(&SearchQuery {
                query,
                num_results: count,
                include_text: include.map(String::from),
                exclude_text: exclude.map(String::from),
            })
            .await
    }
}

/// Prefix the prompt with a YouTube search phrase unless it already mentions
/// "videos" or "youtube" (case-insensitive).
pub fn rewrite_prompt(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    if lower.contains("videos") || lower.contains("youtube") {
        prompt.to_string()
    } else {
        format!("Find youtube videos for: {}", prompt)
    }
}

/// Extract the `v` query parameter from a URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_rewrite_generic_prompt() {
        assert_eq!(
            rewrite_prompt("rust async runtimes"),
            "Find youtube videos for: rust async runtimes"
        );
    }

    #[test]
    fn test_rewrite_leaves_platform_prompts_alone() {
        assert_eq!(rewrite_prompt("best Rust videos"), "best Rust videos");
        assert_eq!(rewrite_prompt("YouTube talks on tokio"), "YouTube talks on tokio");
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PL1&v=abc-123_XY&t=42s"),
            Some("abc-123_XY".to_string())
        );
        // Whatever the parameter carries is returned verbatim
        assert_eq!(
            extract_video_id("https://example.com/page?v=short"),
            Some("short".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_absent() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?vid=x"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
    }

    struct RecordingSearch {
        seen: Mutex<Vec<SearchQuery>>,
    }

    #[async_trait]
    impl VideoSearch for RecordingSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(vec![SearchResult {
                title: Some("Tokio internals".to_string()),
                url: "https://www.youtube.com/watch?v=tok10".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_find_sends_rewritten_prompt_and_filters() {
        let search = Arc::new(RecordingSearch {
            seen: Mutex::new(Vec::new()),
        });
        let discoverer = VideoDiscoverer::new(search.clone());

        let results = discoverer
            .find("rust async runtimes", 3, Some("tokio"), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);

        assert!(matches!(
            discoverer.find("   ", 3, None, None).await,
            Err(TubenotesError::InvalidInput(_))
        ));

        let seen = search.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            SearchQuery {
                query: "Find youtube videos for: rust async runtimes".to_string(),
                num_results: 3,
                include_text: Some("tokio".to_string()),
                exclude_text: None,
            }
        );
    }
}
