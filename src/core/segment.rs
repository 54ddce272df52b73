//! Segment representation.
//!
//! Segments are the trimmed, bounded pieces of an input text produced by
//! the segmenter. They are the unit of transformation and streaming.

use serde::{Deserialize, Serialize};

use crate::io::unicode::{char_len, truncate_chars};

/// A contiguous, trimmed piece of the original text.
///
/// Segments are created once by the segmenter for a given text and budget
/// and are never mutated afterwards; [`Segment::reindexed`] produces a copy.
///
/// # Examples
///
/// ```
/// use chunkstream::core::Segment;
///
/// let segment = Segment::new(1, "Hello, world!".to_string(), "trivial");
/// assert_eq!(segment.char_count(), 13);
/// assert_eq!(segment.estimate_tokens(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position within the ordered segment sequence (1-based).
    pub index: usize,

    /// Segment content, trimmed of leading and trailing whitespace.
    pub content: String,

    /// Name of the strategy that produced this segment.
    pub strategy: String,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(index: usize, content: String, strategy: &str) -> Self {
        Self {
            index,
            content,
            strategy: strategy.to_string(),
        }
    }

    /// Returns a copy of this segment with a different index.
    #[must_use]
    pub fn reindexed(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    /// Returns the segment length in characters (the unit of the budget).
    #[must_use]
    pub fn char_count(&self) -> usize {
        char_len(&self.content)
    }

    /// Returns the segment length in bytes.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.content.len()
    }

    /// Checks if the segment is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Estimates token count using a simple heuristic.
    ///
    /// Uses the approximation of ~4 characters per token.
    #[must_use]
    pub fn estimate_tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }

    /// Returns a preview of the segment content (first `max_chars` characters).
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> &str {
        truncate_chars(&self.content, max_chars)
    }
}

/// Estimates the number of tokens in a text (~4 characters per token).
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    char_len(text).div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_new() {
        let segment = Segment::new(3, "content".to_string(), "windowed");
        assert_eq!(segment.index, 3);
        assert_eq!(segment.content, "content");
        assert_eq!(segment.strategy, "windowed");
        assert!(!segment.is_empty());
    }

    #[test]
    fn test_segment_char_count_vs_bytes() {
        let segment = Segment::new(1, "日本語".to_string(), "trivial");
        assert_eq!(segment.char_count(), 3);
        assert_eq!(segment.byte_len(), 9);
    }

    #[test]
    fn test_segment_reindexed() {
        let segment = Segment::new(1, "abc".to_string(), "paragraph");
        let moved = segment.reindexed(7);
        assert_eq!(moved.index, 7);
        assert_eq!(moved.content, segment.content);
        assert_eq!(segment.index, 1);
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(4000)), 1000);
    }

    #[test]
    fn test_segment_preview() {
        let segment = Segment::new(1, "Hello 世界, more text".to_string(), "trivial");
        assert_eq!(segment.preview(7), "Hello 世");
        assert_eq!(segment.preview(100), segment.content);
    }

    #[test]
    fn test_empty_segment() {
        let segment = Segment::new(1, String::new(), "trivial");
        assert!(segment.is_empty());
        assert_eq!(segment.char_count(), 0);
        assert_eq!(segment.estimate_tokens(), 0);
    }

    #[test]
    fn test_segment_serialization() {
        let segment = Segment::new(2, "text".to_string(), "structural");
        let json = serde_json::to_string(&segment).unwrap();
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(segment, back);
    }
}
