//! Recursive boundary-aware text splitting.
//!
//! Partitions a text buffer into overlapping chunks no larger than a target
//! size, preferring coarse boundaries (paragraph, line, sentence) and falling
//! back to finer ones (word, then a hard character cut) only when a piece is
//! still too large. Separators are dropped at split points and re-inserted
//! when pieces are merged back into a chunk, so a chunk's text can differ
//! from the raw buffer at its trailing boundary; the locator compensates.

use crate::error::{Result, SpoleError};

/// Default boundary separators, coarsest to finest. The empty string is the
/// last-resort hard cut.
const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// Recursive character splitter with overlap.
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter, validating the configuration.
    ///
    /// Fails with [`SpoleError::SplitterInput`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`; both are fatal at startup.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SpoleError::SplitterInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(SpoleError::SplitterInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the default separator list.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Split a buffer into chunk texts in buffer order.
    ///
    /// Every piece of the input ends up in some chunk; consecutive chunks
    /// repeat roughly `chunk_overlap` bytes of trailing context.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the coarsest separator that actually occurs in the text; the
        // empty string always matches and terminates the recursion.
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep.as_str()) {
                separator = sep.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits = split_on_separator(text, &separator);

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in splits {
            if piece.len() < self.chunk_size {
                good_splits.push(piece);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, &separator));
                    good_splits.clear();
                }
                if remaining.is_empty() {
                    // No finer separator left; emit oversized piece as-is.
                    final_chunks.push(piece);
                } else {
                    final_chunks.extend(self.split_recursive(&piece, remaining));
                }
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, &separator));
        }

        final_chunks
    }

    /// Greedily pack splits into chunks of at most `chunk_size` bytes,
    /// carrying `chunk_overlap` bytes of trailing splits into the next chunk.
    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = separator.len();
        let mut docs = Vec::new();
        let mut current: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = piece.len();
            let join_len = if current.is_empty() { 0 } else { sep_len };

            if total + len + join_len > self.chunk_size && !current.is_empty() {
                if let Some(doc) = join_pieces(&current, separator) {
                    docs.push(doc);
                }
                // Drop leading splits until within the overlap budget and the
                // incoming piece fits.
                while total > self.chunk_overlap
                    || (total + len + if current.is_empty() { 0 } else { sep_len }
                        > self.chunk_size
                        && total > 0)
                {
                    let removed = match current.pop_front() {
                        Some(r) => r,
                        None => break,
                    };
                    total -= removed.len() + if current.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push_back(piece);
        }

        if let Some(doc) = join_pieces(&current, separator) {
            docs.push(doc);
        }

        docs
    }
}

/// Split text on a separator, dropping the separator and empty pieces.
/// The empty separator splits into individual characters.
fn split_on_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

/// Join pieces with the separator and trim; None if nothing remains.
fn join_pieces(pieces: &std::collections::VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_config() {
        assert!(RecursiveCharacterSplitter::new(0, 0).is_err());
        assert!(RecursiveCharacterSplitter::new(100, 100).is_err());
        assert!(RecursiveCharacterSplitter::new(100, 200).is_err());
        assert!(RecursiveCharacterSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_buffer_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split_text("A short transcript.");
        assert_eq!(chunks, vec!["A short transcript."]);
    }

    #[test]
    fn test_empty_buffer_yields_no_chunks() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        assert!(splitter.split_text("").is_empty());
    }

    #[test]
    fn test_splits_at_sentence_boundaries() {
        let splitter = RecursiveCharacterSplitter::new(40, 0).unwrap();
        let text = "Hello world. This is Fireship. Learn in 100 seconds. ";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.len() <= 40));
        assert!(chunks[0].starts_with("Hello world"));
        assert!(chunks.last().unwrap().contains("100 seconds"));
    }

    #[test]
    fn test_no_text_silently_lost() {
        let splitter = RecursiveCharacterSplitter::new(30, 5).unwrap();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let chunks = splitter.split_text(text);

        // Every word survives into some chunk.
        for word in text.split_whitespace() {
            assert!(
                chunks.iter().any(|c| c.contains(word)),
                "word {:?} missing from chunks {:?}",
                word,
                chunks
            );
        }
    }

    #[test]
    fn test_overlap_repeats_trailing_context() {
        let splitter = RecursiveCharacterSplitter::new(20, 8).unwrap();
        let text = "alpha beta gamma delta epsilon zeta";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() >= 2);
        // Consecutive chunks share at least one word.
        for pair in chunks.windows(2) {
            let shared = pair[0]
                .split_whitespace()
                .any(|w| pair[1].split_whitespace().any(|v| v == w));
            assert!(shared, "no overlap between {:?} and {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_word_without_boundaries_hard_cut() {
        let splitter = RecursiveCharacterSplitter::new(10, 0).unwrap();
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split_text(text);

        assert!(chunks.iter().all(|c| c.len() <= 10));
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveCharacterSplitter::new(25, 0).unwrap();
        let text = "first paragraph here\n\nsecond paragraph here";
        let chunks = splitter.split_text(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "first paragraph here");
        assert_eq!(chunks[1], "second paragraph here");
    }
}
