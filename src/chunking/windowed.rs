//! Windowed fallback strategy.
//!
//! Slides a window of `max_size` characters over the text and cuts each
//! window at the best boundary found by the [`BoundaryScorer`].

use std::ops::Range;

use tracing::trace;

use crate::chunking::boundary::BoundaryScorer;
use crate::chunking::traits::SegmentStrategy;
use crate::core::ChunkBudget;
use crate::io::unicode::{advance_chars, retreat_chars};

/// Windowed fallback strategy.
///
/// Always applies. Used directly when a text has no structure or
/// paragraph breaks, and by the other strategies for oversized pieces.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::WindowedStrategy;
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(45, 0).unwrap();
/// let text = "First sentence here. Second sentence here. Third one.";
/// let pieces = WindowedStrategy::split_windows(text, &budget);
/// assert_eq!(pieces[0], "First sentence here. Second sentence here.");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowedStrategy;

impl WindowedStrategy {
    /// Computes the byte range of every window, in order.
    ///
    /// Window starts strictly increase and every range holds at most
    /// `max_size` characters.
    #[must_use]
    pub fn windows(text: &str, budget: &ChunkBudget) -> Vec<Range<usize>> {
        let len = text.len();
        let mut ranges = Vec::new();
        let mut start = 0;

        while start < len {
            let edge = advance_chars(text, start, budget.max_size());
            if edge >= len {
                ranges.push(start..len);
                break;
            }

            let min_acceptable = advance_chars(text, start, budget.min_cut_distance());
            let cut = BoundaryScorer::find_cut(text, start, edge, min_acceptable);
            trace!(start, cut = cut.offset, kind = ?cut.kind, "window cut");
            ranges.push(start..cut.offset);

            let with_overlap = retreat_chars(text, cut.offset, budget.overlap());
            let floor = advance_chars(text, start, budget.min_advance());
            let next = with_overlap.max(floor);
            start = if next >= cut.offset || next <= start {
                cut.offset
            } else {
                next
            };
        }

        ranges
    }

    /// Splits the text into trimmed, non-empty windows.
    ///
    /// Returns a single empty string when nothing but whitespace remains.
    #[must_use]
    pub fn split_windows(text: &str, budget: &ChunkBudget) -> Vec<String> {
        let pieces: Vec<String> = Self::windows(text, budget)
            .into_iter()
            .map(|range| text[range].trim())
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();

        if pieces.is_empty() {
            vec![text.trim().to_string()]
        } else {
            pieces
        }
    }
}

impl SegmentStrategy for WindowedStrategy {
    fn split(&self, text: &str, budget: &ChunkBudget) -> Option<Vec<String>> {
        Some(Self::split_windows(text, budget))
    }

    fn name(&self) -> &'static str {
        "windowed"
    }

    fn description(&self) -> &'static str {
        "Slides a size window and cuts at the best sentence, line, or word boundary"
    }
}
