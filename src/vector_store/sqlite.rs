//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large datasets, consider using sqlite-vec
//! extension or a dedicated vector database.
//!
//! Rebuilds are staged: the indexer writes a fresh database next to the live
//! one and [`SqliteVectorStore::finalize`] renames it into place, so a failed
//! run never leaves a half-written index behind.

use super::{cosine_similarity, IndexedVideo, Record, SearchResult, VectorStore};
use crate::error::{Result, SpoleError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS records (
        id TEXT PRIMARY KEY,
        video_id TEXT NOT NULL,
        video_url TEXT NOT NULL,
        video_title TEXT NOT NULL,
        content TEXT NOT NULL,
        start_time REAL NOT NULL,
        embedding BLOB NOT NULL,
        chunk_order INTEGER NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_video_id ON records(video_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteVectorStore {
    /// Open (or create) a vector store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Create a staging store for a destructive rebuild of `final_path`.
    ///
    /// The staging database lives next to the final one; a leftover staging
    /// file from an interrupted run is discarded.
    pub fn staging(final_path: &Path) -> Result<Self> {
        let staging_path = Self::staging_path(final_path);
        if staging_path.exists() {
            std::fs::remove_file(&staging_path)?;
        }
        Self::new(&staging_path)
    }

    /// Close the staging store and atomically replace the live index.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let staging_path = Self::staging_path(final_path);

        let conn = self.conn.into_inner().map_err(|e| {
            SpoleError::IndexPersistence(format!("Failed to take connection: {}", e))
        })?;
        // Checkpoint WAL and release the file before renaming.
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        conn.close()
            .map_err(|(_, e)| SpoleError::IndexPersistence(format!("Failed to close: {}", e)))?;

        std::fs::rename(&staging_path, final_path).map_err(|e| {
            SpoleError::IndexPersistence(format!(
                "Failed to replace index at {:?}: {}",
                final_path, e
            ))
        })?;

        info!("Replaced vector index at {:?}", final_path);
        Ok(())
    }

    fn staging_path(final_path: &Path) -> PathBuf {
        let mut name = final_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "vectors.db".into());
        name.push(".staging");
        final_path.with_file_name(name)
    }

    /// Path this store was opened at (None for in-memory stores).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(6)?;
        let indexed_at_str: String = row.get(8)?;

        Ok(Record {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            video_id: row.get(1)?,
            video_url: row.get(2)?,
            video_title: row.get(3)?,
            content: row.get(4)?,
            start_time: row.get(5)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(7)?,
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, records))]
    async fn upsert_batch(&self, records: &[Record]) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SpoleError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let tx = conn.unchecked_transaction()?;

        for record in records {
            let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO records
                (id, video_id, video_url, video_title, content, start_time,
                 embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    record.id.to_string(),
                    record.video_id,
                    record.video_url,
                    record.video_title,
                    record.content,
                    record.start_time,
                    embedding_bytes,
                    record.chunk_order,
                    record.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} records", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.conn.lock().map_err(|e| {
            SpoleError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, video_id, video_url, video_title, content, start_time,
                   embedding, chunk_order, indexed_at
            FROM records
            "#,
        )?;

        let records = stmt.query_map([], Self::row_to_record)?;

        let mut results: Vec<SearchResult> = records
            .filter_map(|r| r.ok())
            .map(|record| {
                let score = cosine_similarity(query_embedding, &record.embedding);
                SearchResult { record, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching records", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let conn = self.conn.lock().map_err(|e| {
            SpoleError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT video_id, video_url, video_title, COUNT(*) as chunk_count,
                   MAX(start_time) as last_timestamp, MAX(indexed_at) as indexed_at
            FROM records
            GROUP BY video_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let videos = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(5)?;
            Ok(IndexedVideo {
                video_id: row.get(0)?,
                video_url: row.get(1)?,
                video_title: row.get(2)?,
                chunk_count: row.get(3)?,
                last_timestamp_seconds: row.get(4)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        Ok(videos.filter_map(|v| v.ok()).collect())
    }

    async fn record_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SpoleError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let count: usize = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }
}
