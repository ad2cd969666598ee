//! File-based staging area for ingested videos.
//!
//! Layout under the base directory:
//!
//! ```text
//! experiments/youtube/transcripts/unprocessed/<video_id>.json
//! experiments/youtube/transcripts/processed/<video_id>.json
//! ```
//!
//! A record lives in `unprocessed/` until a note has been written for it, then moves to
//! `processed/`.

mod record;

pub use record::VideoRecord;

use crate::config::NoteMode;
use crate::error::{Result, TubenotesError};
use crate::notes::{disambiguated_note_filename, note_filename, NoteGenerator};
use crate::transcript::TranscriptFetcher;
use crate::youtube::{self, PlaylistItem, VideoPlatform};
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const STAGING_COMPONENTS: [&str; 3] = ["experiments", "youtube", "transcripts"];
const UNPROCESSED: &str = "unprocessed";
const PROCESSED: &str = "processed";

/// Outcome of one draining pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrainSummary {
    pub processed: usize,
    pub failed: usize,
    pub notes: Vec<PathBuf>,
}

/// Staging directories rooted at a base directory.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    base_dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn transcripts_dir(&self) -> PathBuf {
        STAGING_COMPONENTS
            .iter()
            .fold(self.base_dir.clone(), |path, c| path.join(c))
    }

    pub fn unprocessed_dir(&self) -> PathBuf {
        self.transcripts_dir().join(UNPROCESSED)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.transcripts_dir().join(PROCESSED)
    }

    /// Create the missing components of the unprocessed path, one level at a time.
    pub fn ensure_directories(&self) -> Result<()> {
        let mut current = self.base_dir.clone();
        for component in STAGING_COMPONENTS.iter().chain(std::iter::once(&UNPROCESSED)) {
            current = current.join(component);
            if current.exists() {
                info!("Directory already exists: {}", current.display());
            } else {
                std::fs::create_dir_all(&current)?;
                info!("Created directory: {}", current.display());
            }
        }
        Ok(())
    }

    /// Staged JSON records, sorted by filename.
    pub fn list_unprocessed(&self) -> Result<Vec<PathBuf>> {
        let dir = self.unprocessed_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                files.push(path);
            } else {
                info!("Ignoring {}", path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Persist a record into `unprocessed/`.
    pub fn stage(&self, record: &VideoRecord) -> Result<PathBuf> {
        let dir = self.unprocessed_dir();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", record.video_id));
        record.save(&path)?;
        Ok(path)
    }

    /// Ingest one playlist item or search hit.
    ///
    /// Videos without a transcript are skipped and their playlist item is kept. Errors are
    /// logged and reported as `None`.
    #[instrument(skip_all)]
    pub async fn ingest(
        &self,
        platform: &dyn VideoPlatform,
        fetcher: &dyn TranscriptFetcher,
        item: &PlaylistItem,
        remove: bool,
    ) -> Option<VideoRecord> {
        let video_id = match item.content_video_id() {
            Some(id) => id.to_string(),
            None => match item.resource_video_id() {
                Some(id) => {
                    info!("Item is missing contentDetails, using id.videoId instead");
                    id.to_string()
                }
                None => {
                    warn!("Skipping item without a video id: {:?}", item.id);
                    return None;
                }
            },
        };

        match self.ingest_video(platform, fetcher, &video_id).await {
            Ok(Some(record)) => {
                if remove {
                    match item.entry_id() {
                        Some(entry_id) => {
                            youtube::remove_item(platform, entry_id).await;
                        }
                        None => warn!("No playlist entry id for {}, not removing", video_id),
                    }
                }
                Some(record)
            }
            Ok(None) => {
                info!("Skipping video {} due to missing transcript", video_id);
                None
            }
            Err(e) => {
                warn!("Error processing video {}: {}", video_id, e);
                None
            }
        }
    }

    async fn ingest_video(
        &self,
        platform: &dyn VideoPlatform,
        fetcher: &dyn TranscriptFetcher,
        video_id: &str,
    ) -> Result<Option<VideoRecord>> {
        let details = platform.get_video_details(video_id).await?;
        let Some(transcript) = fetcher.fetch(video_id).await else {
            return Ok(None);
        };

        let channel_id = &details.snippet.channel_id;
        let channel_name = if channel_id.is_empty() {
            String::new()
        } else {
            platform.get_channel_name(channel_id).await?
        };
        info!("Processing: {} (channel: {})", details.snippet.title, channel_name);

        let record = VideoRecord::from_details(
            video_id,
            &details,
            channel_name,
            transcript,
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        let path = self.stage(&record)?;
        info!("Saved transcript and details to {}", path.display());

        Ok(Some(record))
    }

    /// Turn every staged record into a note in `output_dir`.
    ///
    /// Files are handled one at a time in sorted order. A file whose note fails stays in
    /// `unprocessed/` and the pass moves on.
    #[instrument(skip(self, generator))]
    pub async fn drain_to_notes(
        &self,
        generator: &NoteGenerator,
        mode: NoteMode,
        output_dir: &Path,
    ) -> Result<DrainSummary> {
        std::fs::create_dir_all(self.processed_dir())?;
        std::fs::create_dir_all(output_dir)?;

        let mut summary = DrainSummary::default();
        for path in self.list_unprocessed()? {
            info!("Processing {}", path.display());
            match self.note_for(generator, mode, &path, output_dir).await {
                Ok(note) => {
                    info!("Processed: {}", note.display());
                    summary.processed += 1;
                    summary.notes.push(note);
                }
                Err(e) => {
                    warn!("Error processing {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn note_for(
        &self,
        generator: &NoteGenerator,
        mode: NoteMode,
        path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let record = VideoRecord::load(path)?;
        let markdown = generator.generate(&record, mode).await?;

        let mut note_path = output_dir.join(note_filename(&record.title));
        if note_path.exists() {
            note_path = output_dir.join(disambiguated_note_filename(
                &record.title,
                &record.video_id,
            ));
            debug!("Title already has a note, using {}", note_path.display());
        }
        info!("Writing note to {}", note_path.display());
        std::fs::write(&note_path, markdown)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| TubenotesError::Store(format!("Bad record path {}", path.display())))?;
        std::fs::rename(path, self.processed_dir().join(file_name))?;

        Ok(note_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::CompletionClient;
    use crate::youtube::{ContentDetails, ItemId, VideoDetails, VideoSnippet};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakePlatform {
        details: HashMap<String, VideoDetails>,
        removed: Mutex<Vec<String>>,
    }

    impl FakePlatform {
        fn with_video(mut self, id: &str, title: &str) -> Self {
            self.details.insert(
                id.to_string(),
                VideoDetails {
                    id: id.to_string(),
                    snippet: VideoSnippet {
                        title: title.to_string(),
                        channel_id: "UC1".to_string(),
                        published_at: "2024-03-05T17:00:00Z".to_string(),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            );
            self
        }
    }

    #[async_trait]
    impl VideoPlatform for FakePlatform {
        async fn list_playlist_items(&self, _: &str) -> Result<Vec<PlaylistItem>> {
            Ok(Vec::new())
        }
        async fn get_video_details(&self, id: &str) -> Result<VideoDetails> {
            self.details
                .get(id)
                .cloned()
                .ok_or_else(|| TubenotesError::VideoNotFound(id.to_string()))
        }
        async fn get_channel_name(&self, _: &str) -> Result<String> {
            Ok("Test Channel".to_string())
        }
        async fn find_latest_video(&self, _: &str) -> Result<Option<PlaylistItem>> {
            Ok(None)
        }
        async fn insert_playlist_item(&self, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_playlist_item(&self, id: &str) -> Result<()> {
            self.removed.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    struct FakeTranscripts(HashMap<String, String>);

    #[async_trait]
    impl TranscriptFetcher for FakeTranscripts {
        async fn fetch(&self, video_id: &str) -> Option<String> {
            self.0.get(video_id).cloned()
        }
    }

    struct EchoCompletion;

    #[async_trait]
    impl CompletionClient for EchoCompletion {
        async fn complete(&self, _: &str, prompt: &str, _: f32) -> Result<String> {
            if prompt.contains("FAIL") {
                return Err(TubenotesError::Completion("rate limited".to_string()));
            }
            Ok(format!("note for: {}", prompt.lines().next().unwrap_or_default()))
        }
    }

    fn playlist_item(entry: &str, video: &str) -> PlaylistItem {
        PlaylistItem {
            id: Some(ItemId::Entry(entry.to_string())),
            snippet: None,
            content_details: Some(ContentDetails {
                video_id: Some(video.to_string()),
            }),
        }
    }

    fn staged(store: &TranscriptStore, id: &str, title: &str) {
        store
            .stage(&VideoRecord {
                video_id: id.to_string(),
                title: title.to_string(),
                publish_date: "2024-03-05T17:00:00Z".to_string(),
                transcript: "words".to_string(),
                ..Default::default()
            })
            .unwrap();
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.ensure_directories().unwrap();
        assert!(store.unprocessed_dir().is_dir());
        assert!(dir.path().join("experiments/youtube/transcripts/unprocessed").is_dir());

        store.ensure_directories().unwrap();
        assert!(!store.processed_dir().exists());
    }

    #[tokio::test]
    async fn test_ingest_stages_record_and_removes_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        let platform = FakePlatform::default().with_video("vid1", "First");
        let fetcher = FakeTranscripts(HashMap::from([(
            "vid1".to_string(),
            "hello world".to_string(),
        )]));

        let record = store
            .ingest(&platform, &fetcher, &playlist_item("entry1", "vid1"), true)
            .await
            .unwrap();

        assert_eq!(record.channel_name, "Test Channel");
        assert_eq!(record.transcript, "hello world");
        assert!(record.processed_date.ends_with('Z'));
        assert!(store.unprocessed_dir().join("vid1.json").is_file());
        assert_eq!(*platform.removed.lock().unwrap(), vec!["entry1".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_transcript_writes_nothing_and_keeps_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        let platform = FakePlatform::default().with_video("vid1", "First");
        let fetcher = FakeTranscripts(HashMap::new());

        let record = store
            .ingest(&platform, &fetcher, &playlist_item("entry1", "vid1"), true)
            .await;

        assert!(record.is_none());
        assert!(store.list_unprocessed().unwrap().is_empty());
        assert!(platform.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_search_hit_uses_fallback_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        let platform = FakePlatform::default().with_video("latest1", "Newest");
        let fetcher = FakeTranscripts(HashMap::from([(
            "latest1".to_string(),
            "fresh".to_string(),
        )]));
        let hit: PlaylistItem = serde_json::from_str(
            r#"{"id": {"kind": "youtube#video", "videoId": "latest1"}, "snippet": {"title": "Newest"}}"#,
        )
        .unwrap();

        let record = store.ingest(&platform, &fetcher, &hit, false).await;
        assert_eq!(record.unwrap().video_id, "latest1");
        assert!(platform.removed.lock().unwrap().is_empty());

        // Unknown video: the details lookup fails and the item is skipped
        let missing = store
            .ingest(&platform, &fetcher, &playlist_item("e", "gone"), true)
            .await;
        assert!(missing.is_none());
        assert!(platform.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_writes_one_note_per_record() {
        for n in [0usize, 1, 3] {
            let dir = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let store = TranscriptStore::new(dir.path());
            store.ensure_directories().unwrap();
            for i in 0..n {
                staged(&store, &format!("vid{}", i), &format!("Video {}", i));
            }
            std::fs::write(store.unprocessed_dir().join("notes.txt"), "ignored").unwrap();

            let generator = NoteGenerator::new(Arc::new(EchoCompletion));
            let summary = store
                .drain_to_notes(&generator, NoteMode::Roast, out.path())
                .await
                .unwrap();

            assert_eq!(summary.processed, n);
            assert_eq!(summary.failed, 0);
            let notes = std::fs::read_dir(out.path()).unwrap().count();
            assert_eq!(notes, n);
            let moved = std::fs::read_dir(store.processed_dir()).unwrap().count();
            assert_eq!(moved, n);
            assert_eq!(store.list_unprocessed().unwrap().len(), 0);
        }
    }

    #[tokio::test]
    async fn test_drain_keeps_notes_for_duplicate_titles() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        staged(&store, "a1", "Same Title");
        staged(&store, "b2", "Same Title");

        let generator = NoteGenerator::new(Arc::new(EchoCompletion));
        let summary = store
            .drain_to_notes(&generator, NoteMode::Roast, out.path())
            .await
            .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(
            summary.notes,
            vec![
                out.path().join("Same Title.md"),
                out.path().join("Same Title-b2.md"),
            ]
        );
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
        assert_eq!(std::fs::read_dir(store.processed_dir()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_drain_keeps_failed_records() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        staged(&store, "a", "Good one");
        staged(&store, "b", "FAIL this one");
        std::fs::write(store.unprocessed_dir().join("c.json"), "{not json").unwrap();

        let generator = NoteGenerator::new(Arc::new(EchoCompletion));
        let summary = store
            .drain_to_notes(&generator, NoteMode::Roast, out.path())
            .await
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.notes, vec![out.path().join("Good one.md")]);
        assert!(store.processed_dir().join("a.json").is_file());
        let left: Vec<_> = store
            .list_unprocessed()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(left, vec!["b.json", "c.json"]);
    }
}
