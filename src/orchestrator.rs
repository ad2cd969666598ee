//! Pipeline orchestrator for tubenotes.
//!
//! Coordinates one run: optional discovery into the playlist, transcript ingestion, then
//! note generation. Stages run one after another and every item is awaited in turn.

use crate::auth::{ApiKeyAuth, AuthProvider, InstalledAppAuth};
use crate::config::{NoteMode, Prompts, Settings};
use crate::discovery::{extract_video_id, ExaSearch, VideoDiscoverer, VideoSearch};
use crate::error::Result;
use crate::notes::{CompletionClient, NoteGenerator, OpenAiCompletion};
use crate::openai::http_client;
use crate::store::{DrainSummary, TranscriptStore, VideoRecord};
use crate::transcript::{CaptionFetcher, TranscriptFetcher};
use crate::youtube::{self, VideoPlatform, YoutubeDataClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Discovery request from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverRequest {
    pub prompt: String,
    pub count: usize,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// What a single run should do, beyond the playlist and backlog drains it always does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunPlan {
    pub discover: Option<DiscoverRequest>,
    /// Ingest this channel's latest upload (the playlist is left untouched).
    pub latest_channel: Option<String>,
    pub mode: NoteMode,
}

/// Counts from one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub added: Vec<String>,
    pub ingested: usize,
    pub notes: DrainSummary,
}

/// The main orchestrator for the tubenotes pipeline.
pub struct Pipeline {
    settings: Settings,
    discoverer: VideoDiscoverer,
    platform: Arc<dyn VideoPlatform>,
    transcripts: Arc<dyn TranscriptFetcher>,
    generator: NoteGenerator,
    store: TranscriptStore,
}

impl Pipeline {
    /// Create a pipeline talking to the real services.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let timeout = settings.http_timeout();
        let http = http_client(timeout)?;

        let search: Arc<dyn VideoSearch> = Arc::new(ExaSearch::new(
            http.clone(),
            &settings.search.base_url,
            settings.search.api_key.clone(),
        ));

        let auth = youtube_auth(&settings, http.clone());
        let platform: Arc<dyn VideoPlatform> = Arc::new(YoutubeDataClient::new(http, auth));

        let transcripts: Arc<dyn TranscriptFetcher> = Arc::new(CaptionFetcher::with_timeout(
            timeout,
            &settings.youtube.caption_language,
        )?);

        let completion: Arc<dyn CompletionClient> =
            Arc::new(OpenAiCompletion::new(&settings.llm, timeout)?);

        Ok(Self::with_components(
            settings,
            prompts,
            search,
            platform,
            transcripts,
            completion,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        search: Arc<dyn VideoSearch>,
        platform: Arc<dyn VideoPlatform>,
        transcripts: Arc<dyn TranscriptFetcher>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let generator = NoteGenerator::new(completion)
            .with_prompts(prompts)
            .with_transcript(settings.notes.include_transcript);
        let store = TranscriptStore::new(settings.base_dir());

        Self {
            settings,
            discoverer: VideoDiscoverer::new(search),
            platform,
            transcripts,
            generator,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    fn output_dir(&self) -> PathBuf {
        self.settings.output_dir()
    }

    /// Run every requested stage in order.
    pub async fn run(&self, plan: &RunPlan) -> Result<RunReport> {
        self.store.ensure_directories()?;

        let mut report = RunReport::default();

        if let Some(request) = &plan.discover {
            report.added = self.discover(request).await;
        }

        if let Some(channel_id) = &plan.latest_channel {
            if self.ingest_latest(channel_id).await.is_some() {
                report.ingested += 1;
            }
        }

        report.ingested += self.ingest_playlist().await;
        report.notes = self.process_all(plan.mode).await?;

        Ok(report)
    }

    /// Search for videos and append every resolvable id to the playlist.
    ///
    /// A failed search adds nothing. Returns the ids that were added.
    #[instrument(skip(self))]
    pub async fn discover(&self, request: &DiscoverRequest) -> Vec<String> {
        let Some(playlist_id) = self.playlist_id() else {
            return Vec::new();
        };

        let results = match self
            .discoverer
            .find(
                &request.prompt,
                request.count,
                request.include.as_deref(),
                request.exclude.as_deref(),
            )
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("Error adding videos: {}", e);
                return Vec::new();
            }
        };

        let mut added = Vec::new();
        for result in &results {
            info!(
                "Found: {} ({})",
                result.title.as_deref().unwrap_or("(untitled)"),
                result.url
            );
            let Some(video_id) = extract_video_id(&result.url) else {
                continue;
            };
            if youtube::add_video(self.platform.as_ref(), &video_id, playlist_id).await {
                added.push(video_id);
            }
        }

        info!("Added {} of {} found videos", added.len(), results.len());
        added
    }

    /// Ingest the latest upload of a channel without touching the playlist.
    #[instrument(skip(self))]
    pub async fn ingest_latest(&self, channel_id: &str) -> Option<VideoRecord> {
        let Some(item) = youtube::latest_video(self.platform.as_ref(), channel_id).await else {
            warn!("Failed to ingest latest video of channel {}", channel_id);
            return None;
        };

        self.store
            .ingest(self.platform.as_ref(), self.transcripts.as_ref(), &item, false)
            .await
    }

    /// Ingest every playlist item, removing the ones that produced a record.
    ///
    /// Returns the number of records written.
    #[instrument(skip(self))]
    pub async fn ingest_playlist(&self) -> usize {
        let Some(playlist_id) = self.playlist_id() else {
            return 0;
        };

        let items = match self.platform.list_playlist_items(playlist_id).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Error listing playlist {}: {}", playlist_id, e);
                return 0;
            }
        };
        info!("Found {} videos in playlist {}", items.len(), playlist_id);

        let mut ingested = 0;
        for item in &items {
            if self
                .store
                .ingest(self.platform.as_ref(), self.transcripts.as_ref(), item, true)
                .await
                .is_some()
            {
                ingested += 1;
            }
        }

        info!("All done making transcript files ({} new)", ingested);
        ingested
    }

    /// Drain the staged backlog into notes.
    pub async fn process_all(&self, mode: NoteMode) -> Result<DrainSummary> {
        info!("Processing transcripts in {} mode", mode);
        self.store
            .drain_to_notes(&self.generator, mode, &self.output_dir())
            .await
    }

    fn playlist_id(&self) -> Option<&str> {
        let id = self.settings.youtube.playlist_id.as_deref();
        if id.is_none() {
            warn!("YOUTUBE_PLAYLIST_ID is not set");
        }
        id
    }
}

/// OAuth when a token cache or client secrets exist, else the read-only API key.
fn youtube_auth(settings: &Settings, http: reqwest::Client) -> Arc<dyn AuthProvider> {
    let oauth = InstalledAppAuth::new(
        http,
        settings.client_secrets_path(),
        settings.token_path(),
        settings.youtube.oauth_port,
    );

    match &settings.youtube.api_key {
        Some(key) if !oauth.is_configured() => {
            info!("No OAuth files found, using API key (read-only)");
            Arc::new(ApiKeyAuth::new(key.clone()))
        }
        _ => Arc::new(oauth),
    }
}
