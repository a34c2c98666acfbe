//! Caption transcripts and the offset-to-timestamp map.
//!
//! A transcript is an ordered sequence of caption snippets, each carrying its
//! playback start time. Flattening joins the snippet texts into one buffer and
//! records where each snippet begins, so chunk offsets can later be resolved
//! back to playback timestamps.

use serde::{Deserialize, Serialize};

/// A single time-coded caption snippet, as delivered by the caption source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSnippet {
    /// Caption text.
    pub text: String,
    /// Playback start time in seconds.
    pub start: f64,
}

impl CaptionSnippet {
    pub fn new(text: impl Into<String>, start: f64) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }
}

/// A full caption transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID (e.g. the 11-character YouTube ID).
    pub video_id: String,
    /// Canonical watch URL for the video.
    pub video_url: String,
    /// Video title.
    pub title: String,
    /// Ordered caption snippets with non-decreasing start times.
    pub snippets: Vec<CaptionSnippet>,
}

impl Transcript {
    pub fn new(
        video_id: impl Into<String>,
        video_url: impl Into<String>,
        title: impl Into<String>,
        snippets: Vec<CaptionSnippet>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            video_url: video_url.into(),
            title: title.into(),
            snippets,
        }
    }

    /// Total duration covered by the captions (start of the last snippet).
    pub fn duration_seconds(&self) -> f64 {
        self.snippets.last().map(|s| s.start).unwrap_or(0.0)
    }

    /// Concatenate all snippet texts into one buffer, space-separated, and
    /// record the byte offset at which each snippet begins.
    ///
    /// The offset is captured before the snippet is appended, so every map key
    /// is exactly the position where that snippet's text starts in the buffer.
    /// An empty transcript yields an empty buffer and an empty map.
    pub fn flatten(&self) -> (String, TimestampMap) {
        let mut buffer = String::new();
        let mut entries = Vec::with_capacity(self.snippets.len());

        for snippet in &self.snippets {
            entries.push((buffer.len(), snippet.start));
            buffer.push_str(&snippet.text);
            buffer.push(' ');
        }

        (buffer, TimestampMap { entries })
    }
}

/// Format a playback time in seconds as `MM:SS`, or `HH:MM:SS` past the hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Ordered map from buffer byte offset to playback start time.
///
/// Offsets are strictly increasing in insertion order (every snippet appends
/// at least its separator), which makes predecessor lookup a binary search.
#[derive(Debug, Clone, Default)]
pub struct TimestampMap {
    entries: Vec<(usize, f64)>,
}

impl TimestampMap {
    /// Resolve an offset to the start time of the entry with the greatest
    /// offset not exceeding it. Offsets before the first entry resolve to 0.
    pub fn resolve(&self, offset: usize) -> f64 {
        match self.entries.binary_search_by(|(o, _)| o.cmp(&offset)) {
            Ok(i) => self.entries[i].1,
            Err(0) => 0.0,
            Err(i) => self.entries[i - 1].1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The recorded (offset, start time) entries, in order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(snippets: Vec<CaptionSnippet>) -> Transcript {
        Transcript::new(
            "abc123def45",
            "https://www.youtube.com/watch?v=abc123def45",
            "Test Video",
            snippets,
        )
    }

    #[test]
    fn test_flatten_records_snippet_offsets() {
        let t = transcript(vec![
            CaptionSnippet::new("Hello world.", 0.0),
            CaptionSnippet::new("This is Fireship.", 3.0),
            CaptionSnippet::new("Learn in 100 seconds.", 9.0),
        ]);

        let (buffer, map) = t.flatten();

        assert_eq!(
            buffer,
            "Hello world. This is Fireship. Learn in 100 seconds. "
        );
        assert_eq!(map.len(), 3);

        // Each key points at exactly where its snippet text begins.
        for &(offset, start) in map.entries() {
            let snippet = t.snippets.iter().find(|s| s.start == start).unwrap();
            assert!(buffer[offset..].starts_with(&snippet.text));
        }
    }

    #[test]
    fn test_flatten_offsets_strictly_increasing() {
        let t = transcript(vec![
            CaptionSnippet::new("a", 0.0),
            CaptionSnippet::new("", 1.0),
            CaptionSnippet::new("b", 2.0),
        ]);

        let (_, map) = t.flatten();
        let offsets: Vec<usize> = map.entries().iter().map(|(o, _)| *o).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_flatten_empty_transcript() {
        let t = transcript(vec![]);
        let (buffer, map) = t.flatten();
        assert!(buffer.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_resolve_picks_greatest_preceding_entry() {
        let t = transcript(vec![
            CaptionSnippet::new("aaaa", 0.0),
            CaptionSnippet::new("bbbb", 5.0),
            CaptionSnippet::new("cccc", 12.0),
            CaptionSnippet::new("dddd", 30.0),
        ]);
        let (_, map) = t.flatten();

        // Offsets: 0, 5, 10, 15. An offset between the 12s and 30s snippets
        // must resolve to 12, not 30 and not 0.
        assert_eq!(map.resolve(12), 12.0);
        assert_eq!(map.resolve(14), 12.0);
        assert_eq!(map.resolve(0), 0.0);
        assert_eq!(map.resolve(5), 5.0);
        assert_eq!(map.resolve(1000), 30.0);
    }

    #[test]
    fn test_resolve_empty_map() {
        let map = TimestampMap::default();
        assert_eq!(map.resolve(0), 0.0);
        assert_eq!(map.resolve(42), 0.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(125.8), "02:05");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }
}
