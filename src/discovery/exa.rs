//! Exa neural search client.

use super::{SearchQuery, SearchResult, VideoSearch};
use crate::error::{Result, TubenotesError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Exa `/search` client.
pub struct ExaSearch {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'static str,
    use_autoprompt: bool,
    num_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_text: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_text: Option<Vec<&'a str>>,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

impl ExaSearch {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request_body(query: &SearchQuery) -> SearchRequest<'_> {
        SearchRequest {
            query: &query.query,
            search_type: "neural",
            use_autoprompt: true,
            num_results: query.num_results,
            include_text: query.include_text.as_deref().map(|t| vec![t]),
            exclude_text: query.exclude_text.as_deref().map(|t| vec![t]),
            contents: Contents { text: true },
        }
    }
}

#[async_trait]
impl VideoSearch for ExaSearch {
    #[instrument(skip(self), fields(query = %query.query))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TubenotesError::Search("EXA_API_KEY is not set".to_string()))?;

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", api_key)
            .json(&Self::request_body(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TubenotesError::Search(format!(
                "Search failed ({}): {}",
                status, text
            )));
        }

        let body: SearchResponse = response.json().await?;
        debug!("Search returned {} results", body.results.len());
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let query = SearchQuery {
            query: "Find youtube videos for: zig".to_string(),
            num_results: 5,
            include_text: Some("comptime".to_string()),
            exclude_text: None,
        };
        let json = serde_json::to_value(ExaSearch::request_body(&query)).unwrap();

        assert_eq!(json["type"], "neural");
        assert_eq!(json["useAutoprompt"], true);
        assert_eq!(json["numResults"], 5);
        assert_eq!(json["includeText"], serde_json::json!(["comptime"]));
        assert!(json.get("excludeText").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "autopromptString": "Here is a youtube video about zig:",
            "results": [
                {"id": "1", "title": "Zig in 100 Seconds", "url": "https://www.youtube.com/watch?v=kxT8-C1vmd4", "score": 0.21},
                {"id": "2", "title": null, "url": "https://www.youtube.com/watch?v=abc"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title.as_deref(), Some("Zig in 100 Seconds"));
        assert_eq!(parsed.results[1].title, None);
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let search = ExaSearch::new(reqwest::Client::new(), "https://api.exa.ai/", None);
        let err = search
            .search(&SearchQuery {
                query: "q".to_string(),
                num_results: 1,
                include_text: None,
                exclude_text: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TubenotesError::Search(_)));
    }
}
