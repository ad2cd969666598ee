//! Wire shapes of the YouTube Data API v3 resources used by tubenotes.
//!
//! Every field is optional or defaulted: the API omits parts that weren't requested and
//! statistics the owner has hidden.

use serde::{Deserialize, Serialize};

/// Either a playlist item or a `search.list` hit.
///
/// Playlist items carry their entry id as a string and the video in `contentDetails`;
/// search hits carry the video inside an `id` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub snippet: Option<ItemSnippet>,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Playlist entry id.
    Entry(String),
    /// Resource reference of a search hit.
    Resource(ResourceId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnippet {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    #[serde(default)]
    pub video_id: Option<String>,
}

impl PlaylistItem {
    /// Playlist entry id, needed to remove the item. Search hits have none.
    pub fn entry_id(&self) -> Option<&str> {
        match &self.id {
            Some(ItemId::Entry(id)) => Some(id),
            _ => None,
        }
    }

    /// Video id from `contentDetails.videoId` (playlist items).
    pub fn content_video_id(&self) -> Option<&str> {
        self.content_details.as_ref()?.video_id.as_deref()
    }

    /// Video id from `id.videoId` (search hits).
    pub fn resource_video_id(&self) -> Option<&str> {
        match &self.id {
            Some(ItemId::Resource(resource)) => resource.video_id.as_deref(),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.snippet.as_ref()?.title.as_deref()
    }
}

/// `videos.list` item with `snippet,contentDetails,statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub content_details: VideoContentDetails,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoContentDetails {
    /// ISO 8601 duration, e.g. `PT12M3S`.
    #[serde(default)]
    pub duration: String,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

impl VideoDetails {
    /// URL of the high-resolution thumbnail, or an empty string.
    pub fn thumbnail_url(&self) -> &str {
        self.snippet
            .thumbnails
            .high
            .as_ref()
            .map(|t| t.url.as_str())
            .unwrap_or_default()
    }
}
