//! Timestamp-aware transcript chunking.
//!
//! Converts a time-coded transcript into overlapping text chunks, each
//! annotated with the playback timestamp of the nearest caption boundary at
//! or before the chunk's start. The pipeline is flatten (buffer + timestamp
//! map), split (boundary-aware, text only), then locate (forward search with
//! fallback).

pub mod locator;
pub mod splitter;

pub use locator::{locate, LocatedChunk, Placement};
pub use splitter::RecursiveCharacterSplitter;

use crate::error::Result;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};

/// A chunk of transcript text with its resolved playback timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedChunk {
    /// Trimmed chunk text, never empty.
    pub text: String,
    /// Playback start time in seconds.
    pub start: f64,
}

impl TimedChunk {
    /// Format the timestamp for display.
    pub fn format_timestamp(&self) -> String {
        crate::transcript::format_timestamp(self.start)
    }
}

/// Configuration for transcript chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split a transcript into timestamped chunks.
///
/// An empty transcript yields zero chunks. Fails only on invalid splitter
/// configuration.
pub fn chunk_transcript(transcript: &Transcript, config: &ChunkingConfig) -> Result<Vec<TimedChunk>> {
    let splitter = RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap)?;

    let (buffer, map) = transcript.flatten();
    let chunk_texts = splitter.split_text(&buffer);
    let located = locate(&buffer, &map, &chunk_texts);

    Ok(located
        .into_iter()
        .map(|c| TimedChunk {
            text: c.text,
            start: c.start,
        })
        .collect())
}
