//! Staged video record.

use crate::error::Result;
use crate::youtube::{watch_url, VideoDetails};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything known about one ingested video, as persisted in the staging area.
///
/// Counts stay decimal strings, exactly as the Data API returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoRecord {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub processed_date: String,
    #[serde(default)]
    pub view_count: String,
    #[serde(default)]
    pub like_count: String,
    #[serde(default)]
    pub comment_count: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    /// Older records call this `thumbnail`.
    #[serde(default, alias = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub video_url: String,
}

impl VideoRecord {
    /// Build a record from API details. Hidden statistics become `"0"`.
    pub fn from_details(
        video_id: &str,
        details: &VideoDetails,
        channel_name: String,
        transcript: String,
        processed_date: String,
    ) -> Self {
        let count = |value: &Option<String>| value.clone().unwrap_or_else(|| "0".to_string());

        Self {
            video_id: video_id.to_string(),
            title: details.snippet.title.clone(),
            channel_id: details.snippet.channel_id.clone(),
            channel_name,
            publish_date: details.snippet.published_at.clone(),
            processed_date,
            view_count: count(&details.statistics.view_count),
            like_count: count(&details.statistics.like_count),
            comment_count: count(&details.statistics.comment_count),
            duration: details.content_details.duration.clone(),
            description: details.snippet.description.clone(),
            thumbnail_url: details.thumbnail_url().to_string(),
            transcript,
            video_url: watch_url(video_id),
        }
    }

    /// Pretty JSON with 4-space indentation; non-ASCII is written as-is.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
