//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::{Result, SpoleError};
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;

/// Builds context from search results for RAG.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    min_score: f32,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 3,
            min_score: 0.3,
        }
    }

    /// Set the number of chunks to retrieve per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Build context for a query.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        // Generate query embedding
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| SpoleError::Retrieval(e.to_string()))?;

        // Search for relevant records
        let results = self
            .vector_store
            .search_with_threshold(&query_embedding, self.top_k, self.min_score)
            .await
            .map_err(|e| SpoleError::Retrieval(e.to_string()))?;

        Ok(results.into_iter().map(ContextChunk::from).collect())
    }

    /// Build context from raw search results.
    pub fn from_results(results: Vec<SearchResult>) -> Vec<ContextChunk> {
        results.into_iter().map(ContextChunk::from).collect()
    }
}

/// Format context chunks for inclusion in a prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "---\n[{}] {} @ {}\n{}\n---",
                i + 1,
                chunk.video_title,
                chunk.timestamp,
                chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format context chunks for display to the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "{} @ {} (score: {:.2})\n  {}\n  {}",
                chunk.video_title,
                chunk.timestamp,
                chunk.score,
                chunk.excerpt(),
                chunk.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
