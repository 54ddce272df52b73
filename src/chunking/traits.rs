//! Segmentation strategy trait definition.
//!
//! Defines the interface shared by all segmentation strategies so the
//! segmenter can try them in priority order and fall through.

use crate::core::ChunkBudget;

/// A strategy for cutting a text into bounded pieces.
///
/// A strategy either claims the text, returning its trimmed pieces in
/// order, or declines with `None` so the next strategy is tried.
/// Implementations must be pure and deterministic for the same input.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::{SegmentStrategy, WindowedStrategy};
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(100, 0).unwrap();
/// let text = "Hello, world. ".repeat(20);
/// let pieces = WindowedStrategy.split(&text, &budget).unwrap();
/// assert!(pieces.len() > 1);
/// ```
pub trait SegmentStrategy: Send + Sync {
    /// Splits the text into pieces, or declines.
    ///
    /// # Arguments
    ///
    /// * `text` - The full input text.
    /// * `budget` - Size ceiling and overlap.
    ///
    /// # Returns
    ///
    /// The ordered pieces if this strategy applies, `None` otherwise.
    fn split(&self, text: &str, budget: &ChunkBudget) -> Option<Vec<String>>;

    /// Returns the name of the strategy.
    fn name(&self) -> &'static str;

    /// Returns a description of the strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }
}

/// Returns the input unchanged when it already fits the budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialStrategy;

impl SegmentStrategy for TrivialStrategy {
    fn split(&self, text: &str, budget: &ChunkBudget) -> Option<Vec<String>> {
        // Byte length bounds char count from above.
        let fits = text.len() <= budget.max_size()
            || crate::io::char_len(text) <= budget.max_size();
        fits.then(|| vec![text.to_string()])
    }

    fn name(&self) -> &'static str {
        "trivial"
    }

    fn description(&self) -> &'static str {
        "Returns the text unchanged when it fits within the chunk budget"
    }
}
