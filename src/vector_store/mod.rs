//! Vector store abstraction for Spole.
//!
//! Provides a trait-based interface for different vector index backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A transcript chunk persisted in the vector index.
///
/// This is the unit stored at indexing time and returned on retrieval:
/// chunk text, its resolved playback timestamp, and the owning video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique record ID.
    pub id: Uuid,
    /// Video ID this record belongs to.
    pub video_id: String,
    /// Canonical watch URL for the video.
    pub video_url: String,
    /// Video title.
    pub video_title: String,
    /// Chunk text.
    pub content: String,
    /// Resolved playback start time in seconds.
    pub start_time: f64,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk in the video.
    pub chunk_order: i32,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record.
    pub fn new(
        video_id: String,
        video_url: String,
        video_title: String,
        content: String,
        start_time: f64,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            video_url,
            video_title,
            content,
            start_time,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }

    /// Deep link into the video at this record's timestamp.
    pub fn timestamp_link(&self) -> String {
        format!("{}&t={}s", self.video_url, self.start_time.floor() as u64)
    }

    /// Format timestamp for display.
    pub fn format_timestamp(&self) -> String {
        crate::transcript::format_timestamp(self.start_time)
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched record.
    pub record: Record,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVideo {
    /// Video ID.
    pub video_id: String,
    /// Canonical watch URL.
    pub video_url: String,
    /// Video title.
    pub video_title: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// Timestamp of the last chunk (seconds).
    pub last_timestamp_seconds: f64,
    /// When the video was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk insert records.
    async fn upsert_batch(&self, records: &[Record]) -> Result<usize>;

    /// Search for similar records.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// List all indexed videos.
    async fn list_videos(&self) -> Result<Vec<IndexedVideo>>;

    /// Get total record count.
    async fn record_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
