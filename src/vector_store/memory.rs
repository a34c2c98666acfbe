//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, IndexedVideo, Record, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, records: &[Record]) -> Result<usize> {
        let mut store = self.records.write().unwrap();
        for record in records {
            store.insert(record.id.to_string(), record.clone());
        }
        Ok(records.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let records = self.records.read().unwrap();

        let mut results: Vec<SearchResult> = records
            .values()
            .map(|record| {
                let score = cosine_similarity(query_embedding, &record.embedding);
                SearchResult {
                    record: record.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let records = self.records.read().unwrap();

        let mut video_map: HashMap<String, IndexedVideo> = HashMap::new();

        for record in records.values() {
            let entry = video_map.entry(record.video_id.clone()).or_insert_with(|| {
                IndexedVideo {
                    video_id: record.video_id.clone(),
                    video_url: record.video_url.clone(),
                    video_title: record.video_title.clone(),
                    chunk_count: 0,
                    last_timestamp_seconds: 0.0,
                    indexed_at: record.indexed_at,
                }
            });

            entry.chunk_count += 1;
            if record.start_time > entry.last_timestamp_seconds {
                entry.last_timestamp_seconds = record.start_time;
            }
            if record.indexed_at > entry.indexed_at {
                entry.indexed_at = record.indexed_at;
            }
        }

        let mut videos: Vec<IndexedVideo> = video_map.into_values().collect();
        videos.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(videos)
    }

    async fn record_count(&self) -> Result<usize> {
        let records = self.records.read().unwrap();
        Ok(records.len())
    }
}
