//! Indexing pipeline for Spole.
//!
//! Coordinates the offline stage: enumerate the playlist, then per video
//! fetch captions, chunk, embed, and stage records. Transcript-level failures
//! skip that video only; the batch always continues. The index is rebuilt
//! wholesale: records are staged into a fresh database which atomically
//! replaces the live one on success.

use crate::chunking::{chunk_transcript, ChunkingConfig, RecursiveCharacterSplitter};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::source::{TranscriptSource, VideoEntry, YoutubeSource};
use crate::vector_store::{Record, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The indexing driver.
pub struct Indexer {
    settings: Settings,
    source: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
}

impl Indexer {
    /// Create an indexer with default components.
    ///
    /// Validates the chunking configuration up front; a bad splitter config
    /// is fatal before any video is touched.
    pub fn new(settings: Settings) -> Result<Self> {
        RecursiveCharacterSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )?;

        let embedder = Arc::new(OpenAIEmbedder::new(&settings.embedding));

        Ok(Self {
            settings,
            source: Arc::new(YoutubeSource::new()),
            embedder,
        })
    }

    /// Create an indexer with custom components.
    pub fn with_components(
        settings: Settings,
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        RecursiveCharacterSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )?;

        Ok(Self {
            settings,
            source,
            embedder,
        })
    }

    /// Index a playlist, replacing the persisted index wholesale.
    #[instrument(skip(self), fields(playlist = %playlist_url))]
    pub async fn run(&self, playlist_url: &str) -> Result<IndexReport> {
        info!("Listing playlist videos");
        eprintln!("  Listing playlist videos...");
        let entries = self
            .source
            .list_videos(playlist_url, Some(self.settings.playlist.max_videos))
            .await?;
        eprintln!("  Found {} videos", entries.len());

        let final_path = self.settings.sqlite_path();
        let store = SqliteVectorStore::staging(&final_path)?;

        let report = self.index_into(&store, &entries).await?;

        store.finalize(&final_path)?;
        info!(
            "Indexed {} chunks from {} videos ({} skipped)",
            report.chunks_indexed,
            report.videos_indexed,
            report.skipped.len()
        );

        Ok(report)
    }

    /// Index a batch of videos into a store.
    ///
    /// Per-video transcript errors are recorded in the report and skipped;
    /// anything else aborts the batch.
    pub async fn index_into(
        &self,
        store: &dyn VectorStore,
        entries: &[VideoEntry],
    ) -> Result<IndexReport> {
        let mut report = IndexReport::default();

        for (i, entry) in entries.iter().enumerate() {
            eprintln!("  [{}/{}] {}", i + 1, entries.len(), entry.title);

            match self.index_video(store, entry).await {
                Ok(chunks) => {
                    report.videos_indexed += 1;
                    report.chunks_indexed += chunks;
                    eprintln!("      {} chunks", chunks);
                }
                Err(e) if e.is_per_video() => {
                    warn!("Skipping video {}: {}", entry.id, e);
                    eprintln!("      skipped: {}", e);
                    report.skipped.push((entry.id.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Fetch, chunk, embed, and store one video's transcript.
    async fn index_video(&self, store: &dyn VectorStore, entry: &VideoEntry) -> Result<usize> {
        let transcript = self
            .source
            .fetch_transcript(entry, &self.settings.playlist.languages)
            .await?;

        let config = ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size,
            chunk_overlap: self.settings.chunking.chunk_overlap,
        };
        let chunks = chunk_transcript(&transcript, &config)?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_chunks(&chunks).await?;

        let records: Vec<Record> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (chunk, embedding))| {
                Record::new(
                    transcript.video_id.clone(),
                    transcript.video_url.clone(),
                    transcript.title.clone(),
                    chunk.text,
                    chunk.start,
                    embedding,
                    order as i32,
                )
            })
            .collect();

        store.upsert_batch(&records).await
    }
}

/// Result of an indexing run.
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Number of videos successfully indexed.
    pub videos_indexed: usize,
    /// Total chunks indexed.
    pub chunks_indexed: usize,
    /// Videos skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpoleError;
    use crate::transcript::{CaptionSnippet, Transcript};
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Source serving canned transcripts, with optional per-video failures.
    struct StaticSource {
        transcripts: HashMap<String, Transcript>,
        failures: HashMap<String, fn(String) -> SpoleError>,
    }

    #[async_trait]
    impl TranscriptSource for StaticSource {
        async fn list_videos(
            &self,
            _playlist_url: &str,
            _limit: Option<usize>,
        ) -> crate::error::Result<Vec<VideoEntry>> {
            unimplemented!("tests drive index_into directly")
        }

        async fn fetch_transcript(
            &self,
            entry: &VideoEntry,
            _languages: &[String],
        ) -> crate::error::Result<Transcript> {
            if let Some(make_err) = self.failures.get(&entry.id) {
                return Err(make_err(entry.id.clone()));
            }
            Ok(self.transcripts.get(&entry.id).cloned().unwrap())
        }
    }

    /// Deterministic embedder for tests.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn entry(id: &str) -> VideoEntry {
        VideoEntry {
            id: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={}", id),
            title: format!("Video {}", id),
        }
    }

    fn transcript(id: &str) -> Transcript {
        Transcript::new(
            id,
            format!("https://www.youtube.com/watch?v={}", id),
            format!("Video {}", id),
            vec![
                CaptionSnippet::new("Hello world.", 0.0),
                CaptionSnippet::new("This is Fireship.", 3.0),
                CaptionSnippet::new("Learn in 100 seconds.", 9.0),
            ],
        )
    }

    fn indexer(source: StaticSource) -> Indexer {
        Indexer::with_components(
            Settings::default(),
            Arc::new(source),
            Arc::new(StubEmbedder),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_batch_indexes_all_videos() {
        let source = StaticSource {
            transcripts: HashMap::from([
                ("vidA".to_string(), transcript("vidA")),
                ("vidB".to_string(), transcript("vidB")),
            ]),
            failures: HashMap::new(),
        };
        let indexer = indexer(source);
        let store = MemoryVectorStore::new();

        let report = indexer
            .index_into(&store, &[entry("vidA"), entry("vidB")])
            .await
            .unwrap();

        assert_eq!(report.videos_indexed, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(store.record_count().await.unwrap(), report.chunks_indexed);
    }

    #[tokio::test]
    async fn test_disabled_transcript_does_not_abort_batch() {
        // Video B fails; A's and C's records must still land, and no error
        // escapes the batch.
        let source = StaticSource {
            transcripts: HashMap::from([
                ("vidA".to_string(), transcript("vidA")),
                ("vidC".to_string(), transcript("vidC")),
            ]),
            failures: HashMap::from([(
                "vidB".to_string(),
                SpoleError::TranscriptsDisabled as fn(String) -> SpoleError,
            )]),
        };
        let indexer = indexer(source);
        let store = MemoryVectorStore::new();

        let report = indexer
            .index_into(&store, &[entry("vidA"), entry("vidB"), entry("vidC")])
            .await
            .unwrap();

        assert_eq!(report.videos_indexed, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "vidB");

        let videos = store.list_videos().await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        assert!(ids.contains(&"vidA"));
        assert!(ids.contains(&"vidC"));
        assert!(!ids.contains(&"vidB"));
    }

    #[tokio::test]
    async fn test_fetch_error_is_skipped_too() {
        let source = StaticSource {
            transcripts: HashMap::from([("vidA".to_string(), transcript("vidA"))]),
            failures: HashMap::from([(
                "vidB".to_string(),
                SpoleError::TranscriptFetch as fn(String) -> SpoleError,
            )]),
        };
        let indexer = indexer(source);
        let store = MemoryVectorStore::new();

        let report = indexer
            .index_into(&store, &[entry("vidA"), entry("vidB")])
            .await
            .unwrap();

        assert_eq!(report.videos_indexed, 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_transcript_indexes_zero_chunks() {
        let mut t = transcript("vidA");
        t.snippets.clear();
        let source = StaticSource {
            transcripts: HashMap::from([("vidA".to_string(), t)]),
            failures: HashMap::new(),
        };
        let indexer = indexer(source);
        let store = MemoryVectorStore::new();

        let report = indexer.index_into(&store, &[entry("vidA")]).await.unwrap();

        assert_eq!(report.videos_indexed, 1);
        assert_eq!(report.chunks_indexed, 0);
        assert_eq!(store.record_count().await.unwrap(), 0);
    }

    #[test]
    fn test_bad_chunking_config_is_fatal_at_startup() {
        let mut settings = Settings::default();
        settings.chunking.chunk_overlap = settings.chunking.chunk_size;

        let source = StaticSource {
            transcripts: HashMap::new(),
            failures: HashMap::new(),
        };
        let result = Indexer::with_components(settings, Arc::new(source), Arc::new(StubEmbedder));
        assert!(matches!(result, Err(SpoleError::SplitterInput(_))));
    }

    #[tokio::test]
    async fn test_records_carry_video_attribution_and_timestamps() {
        let source = StaticSource {
            transcripts: HashMap::from([("vidA".to_string(), transcript("vidA"))]),
            failures: HashMap::new(),
        };
        let indexer = indexer(source);
        let store = MemoryVectorStore::new();

        indexer.index_into(&store, &[entry("vidA")]).await.unwrap();

        let results = store.search(&[1.0, 1.0, 0.0], 10).await.unwrap();
        assert!(!results.is_empty());
        for result in &results {
            assert_eq!(result.record.video_id, "vidA");
            assert!(result
                .record
                .timestamp_link()
                .starts_with("https://www.youtube.com/watch?v=vidA&t="));
        }
    }
}
