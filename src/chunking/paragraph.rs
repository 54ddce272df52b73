//! Paragraph combining strategy.

use regex::Regex;
use std::sync::OnceLock;

use crate::chunking::packing::pack;
use crate::chunking::traits::SegmentStrategy;
use crate::core::ChunkBudget;

/// Matches a blank line, including lines holding only whitespace.
#[allow(clippy::expect_used)]
fn paragraph_break() -> &'static Regex {
    static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH_BREAK.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

/// Paragraph combining strategy.
///
/// Splits on blank lines and greedily combines consecutive paragraphs,
/// separated by a blank line, into chunks within the budget. Oversized
/// paragraphs are handed to the windowed strategy. Declines when the text
/// has a single paragraph.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::{ParagraphStrategy, SegmentStrategy};
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(30, 0).unwrap();
/// let text = "First paragraph.\n\nSecond one.\n\nThird paragraph here.";
/// let chunks = ParagraphStrategy.split(text, &budget).unwrap();
/// assert_eq!(chunks[0], "First paragraph.\n\nSecond one.");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphStrategy;

impl ParagraphStrategy {
    /// Splits the text into raw paragraphs.
    #[must_use]
    pub fn paragraphs(text: &str) -> Vec<&str> {
        paragraph_break().split(text).collect()
    }
}

impl SegmentStrategy for ParagraphStrategy {
    fn split(&self, text: &str, budget: &ChunkBudget) -> Option<Vec<String>> {
        let paragraphs = Self::paragraphs(text);
        if paragraphs.len() <= 1 {
            return None;
        }
        let chunks = pack(paragraphs, budget, "\n\n");
        (!chunks.is_empty()).then_some(chunks)
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn description(&self) -> &'static str {
        "Combines consecutive paragraphs into the largest chunks that fit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::char_len;

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let text = "one\n\ntwo\n   \nthree\nstill three";
        assert_eq!(
            ParagraphStrategy::paragraphs(text),
            vec!["one", "two", "three\nstill three"]
        );
    }

    #[test]
    fn test_paragraph_declines_single_paragraph() {
        let budget = ChunkBudget::new(5, 0).unwrap();
        assert!(ParagraphStrategy.split("one long line of text", &budget).is_none());
    }

    #[test]
    fn test_paragraph_combines_greedily() {
        let budget = ChunkBudget::new(10, 0).unwrap();
        let chunks = ParagraphStrategy.split("aaa\n\nbbb\n\nccc\n\nddd", &budget).unwrap();
        assert_eq!(chunks, vec!["aaa\n\nbbb".to_string(), "ccc\n\nddd".to_string()]);
    }

    #[test]
    fn test_paragraph_oversized_goes_windowed() {
        let budget = ChunkBudget::new(20, 0).unwrap();
        let long = "Sentence one. Sentence two. Sentence three.";
        let text = format!("intro\n\n{long}\n\noutro");
        let chunks = ParagraphStrategy.split(&text, &budget).unwrap();

        assert_eq!(chunks.first().map(String::as_str), Some("intro"));
        assert_eq!(chunks.last().map(String::as_str), Some("outro"));
        assert!(chunks.len() >= 4);
        assert!(chunks.iter().all(|c| char_len(c) <= 20));
    }

    #[test]
    fn test_paragraph_declines_blank_text() {
        let budget = ChunkBudget::new(2, 0).unwrap();
        assert!(ParagraphStrategy.split("  \n\n  \n\n  ", &budget).is_none());
    }
}
