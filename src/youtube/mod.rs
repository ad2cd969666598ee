//! YouTube Data API abstraction.
//!
//! [`VideoPlatform`] is the narrow interface the pipeline needs from the platform:
//! playlist reads and writes, per-video details, channel names and latest uploads.

mod data_api;
mod models;

pub use data_api::YoutubeDataClient;
pub use models::{
    ContentDetails, ItemId, PlaylistItem, Statistics, Thumbnail, Thumbnails, VideoContentDetails,
    VideoDetails, VideoSnippet,
};

use crate::error::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Trait for the video platform's data API.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// List every item of a playlist, following pagination to the end.
    async fn list_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>>;

    /// Fetch snippet, content details and statistics for one video.
    ///
    /// Fails with `VideoNotFound` when the platform returns no item.
    async fn get_video_details(&self, video_id: &str) -> Result<VideoDetails>;

    /// Fetch a channel's display name.
    async fn get_channel_name(&self, channel_id: &str) -> Result<String>;

    /// Most recent upload of a channel, as a search hit.
    async fn find_latest_video(&self, channel_id: &str) -> Result<Option<PlaylistItem>>;

    /// Append a video to a playlist.
    async fn insert_playlist_item(&self, video_id: &str, playlist_id: &str) -> Result<()>;

    /// Remove one playlist entry (by playlist-item id, not video id).
    async fn delete_playlist_item(&self, playlist_item_id: &str) -> Result<()>;
}

/// Add a video to a playlist. Failures are logged and reported as `false`.
pub async fn add_video(platform: &dyn VideoPlatform, video_id: &str, playlist_id: &str) -> bool {
    match platform.insert_playlist_item(video_id, playlist_id).await {
        Ok(()) => {
            info!("Added video {} to playlist {}", video_id, playlist_id);
            true
        }
        Err(e) => {
            warn!("Error adding video {} to playlist {}: {}", video_id, playlist_id, e);
            false
        }
    }
}

/// Remove a playlist item. Failures are logged and reported as `false`.
pub async fn remove_item(platform: &dyn VideoPlatform, playlist_item_id: &str) -> bool {
    match platform.delete_playlist_item(playlist_item_id).await {
        Ok(()) => {
            info!("Removed {} from playlist", playlist_item_id);
            true
        }
        Err(e) => {
            warn!("Error removing {} from playlist: {}", playlist_item_id, e);
            false
        }
    }
}

/// Latest upload of a channel; `None` when the channel is empty or the call fails.
pub async fn latest_video(platform: &dyn VideoPlatform, channel_id: &str) -> Option<PlaylistItem> {
    match platform.find_latest_video(channel_id).await {
        Ok(Some(item)) => {
            info!(
                "Latest video found: {}",
                item.title().unwrap_or("(untitled)")
            );
            Some(item)
        }
        Ok(None) => {
            info!("No videos found for channel {}", channel_id);
            None
        }
        Err(e) => {
            warn!("Error fetching latest video from channel {}: {}", channel_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TubenotesError;

    struct FailingPlatform;

    #[async_trait]
    impl VideoPlatform for FailingPlatform {
        async fn list_playlist_items(&self, _: &str) -> Result<Vec<PlaylistItem>> {
            Err(TubenotesError::YouTube("quota exceeded".to_string()))
        }
        async fn get_video_details(&self, id: &str) -> Result<VideoDetails> {
            Err(TubenotesError::VideoNotFound(id.to_string()))
        }
        async fn get_channel_name(&self, _: &str) -> Result<String> {
            Err(TubenotesError::YouTube("quota exceeded".to_string()))
        }
        async fn find_latest_video(&self, _: &str) -> Result<Option<PlaylistItem>> {
            Err(TubenotesError::YouTube("quota exceeded".to_string()))
        }
        async fn insert_playlist_item(&self, _: &str, _: &str) -> Result<()> {
            Err(TubenotesError::YouTube("forbidden".to_string()))
        }
        async fn delete_playlist_item(&self, _: &str) -> Result<()> {
            Err(TubenotesError::YouTube("forbidden".to_string()))
        }
    }

    #[tokio::test]
    async fn test_mutations_swallow_errors() {
        let platform = FailingPlatform;
        assert!(!add_video(&platform, "vid", "PL").await);
        assert!(!remove_item(&platform, "item").await);
        assert!(latest_video(&platform, "UC").await.is_none());
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
    }
}
