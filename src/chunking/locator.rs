//! Chunk placement: resolving chunk texts back to buffer offsets.
//!
//! The splitter returns bare text; this module finds where each chunk starts
//! in the original buffer so its playback timestamp can be resolved. Search
//! runs forward only, through one cursor threaded chunk to chunk, so repeated
//! phrases earlier in the buffer can never pull a chunk backwards.

use crate::transcript::TimestampMap;

/// How a chunk's offset was determined.
///
/// Exact and approximate placement are kept distinct so callers and tests can
/// tell them apart; both carry the resolved offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The chunk text was found verbatim at this offset.
    Found(usize),
    /// The chunk text could not be found at or after the cursor (the splitter
    /// normalizes whitespace at chunk boundaries); the cursor position itself
    /// is used so the chunk is never dropped. This can occasionally attribute
    /// a slightly earlier timestamp than the chunk's true position.
    Fallback(usize),
}

impl Placement {
    /// The resolved buffer offset.
    pub fn offset(&self) -> usize {
        match *self {
            Placement::Found(o) | Placement::Fallback(o) => o,
        }
    }
}

/// A chunk with its resolved offset and timestamp.
#[derive(Debug, Clone)]
pub struct LocatedChunk {
    /// Trimmed chunk text, never empty.
    pub text: String,
    /// Resolved playback start time in seconds.
    pub start: f64,
    /// How the offset was determined.
    pub placement: Placement,
}

/// Locate each chunk text in the buffer and resolve its timestamp.
///
/// Modeled as a fold with accumulator `(search_start, results)`: for each
/// chunk, search the buffer at or after `search_start`, fall back to
/// `search_start` on a miss, resolve the timestamp via the map, then advance
/// the cursor past the chunk. `search_start` is non-decreasing across the
/// sequence. Chunks that are empty after trimming are dropped.
pub fn locate(buffer: &str, map: &TimestampMap, chunk_texts: &[String]) -> Vec<LocatedChunk> {
    let (_, located) = chunk_texts.iter().fold(
        (0usize, Vec::with_capacity(chunk_texts.len())),
        |(search_start, mut results), chunk_text| {
            // The cursor can run past the end of the buffer once fallbacks
            // start stacking; an out-of-range tail just means "not found".
            let tail = buffer.get(search_start..).unwrap_or("");

            let placement = match tail.find(chunk_text.as_str()) {
                Some(rel) => Placement::Found(search_start + rel),
                None => Placement::Fallback(search_start),
            };

            let offset = placement.offset();
            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                results.push(LocatedChunk {
                    text: trimmed.to_string(),
                    start: map.resolve(offset),
                    placement,
                });
            }

            (offset + chunk_text.len(), results)
        },
    );

    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{CaptionSnippet, Transcript};

    fn flatten(snippets: Vec<CaptionSnippet>) -> (String, TimestampMap) {
        Transcript::new("vid", "https://www.youtube.com/watch?v=vid", "t", snippets).flatten()
    }

    #[test]
    fn test_exact_placement() {
        let (buffer, map) = flatten(vec![
            CaptionSnippet::new("Hello world.", 0.0),
            CaptionSnippet::new("This is Fireship.", 3.0),
            CaptionSnippet::new("Learn in 100 seconds.", 9.0),
        ]);

        let chunks = vec![
            "Hello world. This is Fireship".to_string(),
            "Learn in 100 seconds.".to_string(),
        ];
        let located = locate(&buffer, &map, &chunks);

        assert_eq!(located.len(), 2);
        assert!(matches!(located[0].placement, Placement::Found(0)));
        assert_eq!(located[0].start, 0.0);
        // Second chunk starts at the third snippet (offset 31).
        assert!(matches!(located[1].placement, Placement::Found(31)));
        assert_eq!(located[1].start, 9.0);
    }

    #[test]
    fn test_fallback_on_unfindable_chunk() {
        let (buffer, map) = flatten(vec![
            CaptionSnippet::new("some caption text", 0.0),
            CaptionSnippet::new("more caption text", 7.0),
        ]);

        let chunks = vec![
            "some caption".to_string(),
            "NOT IN THE BUFFER".to_string(),
            "caption text".to_string(),
        ];
        let located = locate(&buffer, &map, &chunks);

        // The unfindable chunk is placed at the cursor, not dropped.
        assert_eq!(located.len(), 3);
        assert_eq!(located[1].placement, Placement::Fallback(12));
        assert_eq!(located[1].text, "NOT IN THE BUFFER");
    }

    #[test]
    fn test_repeated_phrase_does_not_regress_cursor() {
        // "the end" appears twice; the second chunk must match the later
        // occurrence even though an earlier one exists.
        let (buffer, map) = flatten(vec![
            CaptionSnippet::new("the end is near", 0.0),
            CaptionSnippet::new("this is the end", 20.0),
        ]);

        let chunks = vec!["the end is near".to_string(), "the end".to_string()];
        let located = locate(&buffer, &map, &chunks);

        assert_eq!(located.len(), 2);
        let second = located[1].placement.offset();
        assert!(second > 0, "second chunk matched the earlier occurrence");
        assert_eq!(located[1].start, 20.0);
    }

    #[test]
    fn test_search_start_is_non_decreasing() {
        let (buffer, map) = flatten(vec![
            CaptionSnippet::new("alpha beta gamma delta", 0.0),
            CaptionSnippet::new("epsilon zeta eta theta", 10.0),
        ]);

        let chunks = vec![
            "alpha beta".to_string(),
            "gamma delta".to_string(),
            "missing entirely".to_string(),
            "zeta eta".to_string(),
        ];
        let located = locate(&buffer, &map, &chunks);

        let offsets: Vec<usize> = located.iter().map(|c| c.placement.offset()).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_chunks_dropped() {
        let (buffer, map) = flatten(vec![CaptionSnippet::new("text here", 0.0)]);

        let chunks = vec!["text".to_string(), "   ".to_string(), "here".to_string()];
        let located = locate(&buffer, &map, &chunks);

        assert_eq!(located.len(), 2);
        assert_eq!(located[0].text, "text");
        assert_eq!(located[1].text, "here");
    }

    #[test]
    fn test_cursor_past_end_of_buffer() {
        let (buffer, map) = flatten(vec![CaptionSnippet::new("tiny", 0.0)]);

        // Long unfindable chunks push the cursor past the buffer end; later
        // chunks must still be handled without panicking.
        let chunks = vec![
            "this chunk is much longer than the buffer itself".to_string(),
            "another one".to_string(),
        ];
        let located = locate(&buffer, &map, &chunks);

        assert_eq!(located.len(), 2);
        assert!(matches!(located[0].placement, Placement::Fallback(0)));
        assert!(matches!(located[1].placement, Placement::Fallback(_)));
    }
}
