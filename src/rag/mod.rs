//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Provides the ability to ask questions and get answers from the playlist
//! knowledge base, each answer cited with deep links into video moments.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{ChatModel, OpenAIChatModel, RagEngine, RagResponse};

use crate::vector_store::SearchResult;

/// Maximum excerpt length shown in citations.
pub const EXCERPT_LEN: usize = 200;

/// A retrieved chunk with formatted citation data for display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Video ID.
    pub video_id: String,
    /// Video title.
    pub video_title: String,
    /// Formatted timestamp (e.g., "02:34").
    pub timestamp: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// Full chunk text.
    pub content: String,
    /// Similarity score.
    pub score: f32,
    /// Deep link into the video at the chunk's timestamp.
    pub link: String,
}

impl ContextChunk {
    /// First 200 characters of the chunk content, for citation display.
    pub fn excerpt(&self) -> &str {
        match self.content.char_indices().nth(EXCERPT_LEN) {
            Some((i, _)) => &self.content[..i],
            None => &self.content,
        }
    }
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            video_id: result.record.video_id.clone(),
            video_title: result.record.video_title.clone(),
            timestamp: result.record.format_timestamp(),
            start_time: result.record.start_time,
            link: result.record.timestamp_link(),
            content: result.record.content,
            score: result.score,
        }
    }
}
