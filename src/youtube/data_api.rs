//! YouTube Data API v3 client over reqwest.

use super::{PlaylistItem, VideoDetails, VideoPlatform};
use crate::auth::AuthProvider;
use crate::error::{Result, TubenotesError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for `playlistItems.list` (the API maximum).
const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

/// Authenticated Data API client.
pub struct YoutubeDataClient {
    http: reqwest::Client,
    auth: Arc<dyn AuthProvider>,
    base_url: String,
}

impl YoutubeDataClient {
    pub fn new(http: reqwest::Client, auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_base_url(http, auth, YOUTUBE_API_BASE)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        auth: Arc<dyn AuthProvider>,
        base_url: &str,
    ) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// Send an authenticated request and check the status.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response> {
        let credential = self.auth.credential().await?;
        let response = credential.apply(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TubenotesError::YouTube(format!(
                "{} failed ({}): {}",
                what, status, text
            )));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<ListResponse<T>> {
        let request = self.http.get(self.url(resource)).query(query);
        let response = self.send(request, &format!("{}.list", resource)).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoPlatform for YoutubeDataClient {
    #[instrument(skip(self))]
    async fn list_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: ListResponse<PlaylistItem> = self.get_json("playlistItems", &query).await?;
            debug!("Fetched {} playlist items", page.items.len());
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }

    #[instrument(skip(self))]
    async fn get_video_details(&self, video_id: &str) -> Result<VideoDetails> {
        let response: ListResponse<VideoDetails> = self
            .get_json(
                "videos",
                &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| TubenotesError::VideoNotFound(video_id.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_channel_name(&self, channel_id: &str) -> Result<String> {
        let response: ListResponse<ChannelItem> = self
            .get_json("channels", &[("part", "snippet"), ("id", channel_id)])
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|c| c.snippet.title)
            .ok_or_else(|| TubenotesError::YouTube(format!("Channel {} not found", channel_id)))
    }

    #[instrument(skip(self))]
    async fn find_latest_video(&self, channel_id: &str) -> Result<Option<PlaylistItem>> {
        let response: ListResponse<PlaylistItem> = self
            .get_json(
                "search",
                &[
                    ("part", "id,snippet"),
                    ("channelId", channel_id),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        Ok(response.items.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn insert_playlist_item(&self, video_id: &str, playlist_id: &str) -> Result<()> {
        let body = serde_json::json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id,
                }
            }
        });

        let request = self
            .http
            .post(self.url("playlistItems"))
            .query(&[("part", "snippet")])
            .json(&body);
        self.send(request, "playlistItems.insert").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_playlist_item(&self, playlist_item_id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.url("playlistItems"))
            .query(&[("id", playlist_item_id)]);
        self.send(request, "playlistItems.delete").await?;
        Ok(())
    }
}
