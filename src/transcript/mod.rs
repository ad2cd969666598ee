//! Transcript retrieval.
//!
//! A missing transcript is an expected condition (captions disabled, no track, network
//! trouble), so fetchers report it as `None` rather than an error.

mod captions;

pub use captions::CaptionFetcher;

use async_trait::async_trait;

/// One timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Full transcript text of a video, or `None` when it can't be obtained.
    async fn fetch(&self, video_id: &str) -> Option<String>;
}

/// Join segment texts with single spaces, skipping blank segments.
pub fn join_segments(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
