//! Video sources for transcript indexing.
//!
//! A source can enumerate the videos of a playlist and fetch the caption
//! transcript for a single video. Transcript-level failures are per-video and
//! never abort the batch.

mod youtube;

pub use youtube::YoutubeSource;

use crate::error::Result;
use crate::transcript::Transcript;
use async_trait::async_trait;

/// A video discovered in a playlist.
#[derive(Debug, Clone)]
pub struct VideoEntry {
    /// Video ID (e.g. the 11-character YouTube ID).
    pub id: String,
    /// Canonical watch URL.
    pub url: String,
    /// Video title, if the playlist listing carried one.
    pub title: String,
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// List the videos of a playlist, capped at `limit` entries.
    async fn list_videos(&self, playlist_url: &str, limit: Option<usize>)
        -> Result<Vec<VideoEntry>>;

    /// Fetch the caption transcript for one video, trying languages in
    /// preference order.
    async fn fetch_transcript(&self, entry: &VideoEntry, languages: &[String])
        -> Result<Transcript>;
}
