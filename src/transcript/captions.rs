//! Public caption tracks scraped from the watch page.

use super::{join_segments, CaptionSegment, TranscriptFetcher};
use crate::error::{Result, TubenotesError};
use crate::youtube::watch_url;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

/// The watch page only embeds the player response for browser-like clients.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: TrackList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackList {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
}

/// Fetches transcripts from YouTube's timed-text caption tracks.
pub struct CaptionFetcher {
    http: reqwest::Client,
    language: String,
    segment_re: Regex,
}

impl CaptionFetcher {
    pub fn new(http: reqwest::Client, language: &str) -> Result<Self> {
        let segment_re =
            Regex::new(r#"<text start="([^"]+)" dur="([^"]+)"[^>]*>([^<]*)</text>"#)
                .map_err(|e| TubenotesError::Transcript(e.to_string()))?;

        Ok(Self {
            http,
            language: language.to_string(),
            segment_re,
        })
    }

    /// Fetcher with its own browser-like HTTP client.
    pub fn with_timeout(timeout: Duration, language: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| TubenotesError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Self::new(http, language)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TubenotesError::Transcript(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    async fn fetch_segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>> {
        let html = self.get_text(&watch_url(video_id)).await?;
        let tracks = caption_tracks(&html)?;
        let track = pick_track(&tracks, &self.language).ok_or_else(|| {
            TubenotesError::Transcript("No caption tracks available".to_string())
        })?;
        debug!("Using caption track '{}'", track.language_code);

        let xml = self.get_text(&track.base_url).await?;
        let segments = parse_timed_text(&self.segment_re, &xml);
        if segments.is_empty() {
            return Err(TubenotesError::Transcript(
                "Caption track contained no lines".to_string(),
            ));
        }
        Ok(segments)
    }
}

#[async_trait]
impl TranscriptFetcher for CaptionFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Option<String> {
        match self.fetch_segments(video_id).await {
            Ok(segments) => {
                info!("Fetched {} caption lines for {}", segments.len(), video_id);
                Some(join_segments(&segments))
            }
            Err(e) => {
                warn!("Error fetching transcript for video {}: {}", video_id, e);
                None
            }
        }
    }
}

/// Caption tracks listed in the watch page's embedded player response.
fn caption_tracks(html: &str) -> Result<Vec<CaptionTrack>> {
    let start = html
        .find(PLAYER_RESPONSE_MARKER)
        .map(|i| i + PLAYER_RESPONSE_MARKER.len())
        .ok_or_else(|| TubenotesError::Transcript("Cannot find player data".to_string()))?;

    // The object is followed by more script; read one value and stop.
    let player: PlayerResponse = serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<PlayerResponse>()
        .next()
        .ok_or_else(|| TubenotesError::Transcript("Empty player data".to_string()))??;
    let tracks = player
        .captions
        .map(|c| c.player_captions_tracklist_renderer.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TubenotesError::Transcript(
            "Captions are disabled for this video".to_string(),
        ));
    }
    Ok(tracks)
}

/// Preferred-language track, falling back to the first listed.
fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == language)
        .or_else(|| tracks.first())
}

fn parse_timed_text(re: &Regex, xml: &str) -> Vec<CaptionSegment> {
    re.captures_iter(xml)
        .map(|cap| CaptionSegment {
            start: cap[1].parse().unwrap_or(0.0),
            duration: cap[2].parse().unwrap_or(0.0),
            text: decode_caption_text(&cap[3]),
        })
        .collect()
}

/// Caption text is escaped twice: once for the XML and once as HTML.
fn decode_caption_text(raw: &str) -> String {
    let xml_decoded = html_escape::decode_html_entities(raw);
    html_escape::decode_html_entities(&xml_decoded).replace('\n', " ")
}
