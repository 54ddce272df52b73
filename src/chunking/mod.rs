//! Adaptive text segmentation.
//!
//! Splits a long text into an ordered sequence of bounded segments,
//! preferring structural, paragraph, and sentence boundaries. Strategies
//! are tried in priority order and the first that applies wins:
//!
//! - **Trivial**: the text already fits the budget
//! - **Structural**: headers, chapter markers, title lines, rules
//! - **Paragraph**: greedy combination of blank-line separated paragraphs
//! - **Windowed**: size windows cut at the best boundary, always applies

pub mod boundary;
pub mod packing;
pub mod paragraph;
pub mod structural;
pub mod traits;
pub mod windowed;

pub use boundary::{BoundaryScorer, BoundaryTier, Cut, CutCandidate, CutKind};
pub use paragraph::ParagraphStrategy;
pub use structural::{StructuralPattern, StructuralStrategy};
pub use traits::{SegmentStrategy, TrivialStrategy};
pub use windowed::WindowedStrategy;

use tracing::debug;

use crate::core::{ChunkBudget, Segment};
use crate::error::SegmentationError;

/// Characters per token assumed when re-splitting for a token limit (3.5).
const CHARS_PER_TOKEN_NUMERATOR: usize = 7;
const CHARS_PER_TOKEN_DENOMINATOR: usize = 2;

/// Ordered collection of segmentation strategies.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::Segmenter;
/// use chunkstream::core::ChunkBudget;
///
/// let segmenter = Segmenter::new();
/// let segments = segmenter.segment("Short text.", &ChunkBudget::default());
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].strategy, "trivial");
/// ```
pub struct Segmenter {
    strategies: Vec<Box<dyn SegmentStrategy>>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl Segmenter {
    /// Creates a segmenter with the default strategy order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(TrivialStrategy),
            Box::new(StructuralStrategy),
            Box::new(ParagraphStrategy),
            Box::new(WindowedStrategy),
        ])
    }

    /// Creates a segmenter with a custom strategy order.
    ///
    /// When every strategy declines, the windowed strategy is used.
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn SegmentStrategy>>) -> Self {
        Self { strategies }
    }

    /// Returns the names of the configured strategies, in order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Segments a text under the given budget.
    ///
    /// Always returns at least one segment. Empty input yields a single
    /// empty segment. Indices are 1-based.
    #[must_use]
    pub fn segment(&self, text: &str, budget: &ChunkBudget) -> Vec<Segment> {
        let (name, pieces) = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.split(text, budget).map(|p| (strategy.name(), p)))
            .unwrap_or_else(|| {
                (
                    WindowedStrategy.name(),
                    WindowedStrategy::split_windows(text, budget),
                )
            });

        debug!(
            strategy = name,
            segments = pieces.len(),
            max_size = budget.max_size(),
            "text segmented"
        );

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| Segment::new(i + 1, content, name))
            .collect()
    }

    /// Re-splits segments whose estimated token count exceeds `max_tokens`.
    ///
    /// Oversized segments are segmented again with a ceiling of
    /// `max_tokens * 3.5` characters. The result is re-indexed from 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_tokens` is zero or the derived ceiling is
    /// out of range.
    pub fn enforce_token_limit(
        &self,
        segments: Vec<Segment>,
        max_tokens: usize,
    ) -> Result<Vec<Segment>, SegmentationError> {
        if max_tokens == 0 {
            return Err(SegmentationError::InvalidBudget {
                reason: "max_tokens must be > 0".to_string(),
            });
        }
        let char_limit = max_tokens.saturating_mul(CHARS_PER_TOKEN_NUMERATOR)
            / CHARS_PER_TOKEN_DENOMINATOR;
        let budget = ChunkBudget::from_overrides(Some(char_limit), None)?;

        let mut result = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.estimate_tokens() <= max_tokens {
                result.push(segment);
                continue;
            }
            debug!(
                index = segment.index,
                tokens = segment.estimate_tokens(),
                max_tokens,
                "segment over token limit, re-splitting"
            );
            result.extend(self.segment(&segment.content, &budget));
        }

        Ok(result
            .into_iter()
            .enumerate()
            .map(|(i, segment)| segment.reindexed(i + 1))
            .collect())
    }
}

/// Segments a text with the default strategies.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::segment;
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(20, 0).unwrap();
/// let segments = segment("First part here.\n\nSecond part here.", &budget);
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[1].index, 2);
/// ```
#[must_use]
pub fn segment(text: &str, budget: &ChunkBudget) -> Vec<Segment> {
    Segmenter::new().segment(text, budget)
}

/// Re-splits segments over a token limit with the default strategies.
///
/// # Errors
///
/// Returns an error if `max_tokens` is zero or too large.
pub fn enforce_token_limit(
    segments: Vec<Segment>,
    max_tokens: usize,
) -> Result<Vec<Segment>, SegmentationError> {
    Segmenter::new().enforce_token_limit(segments, max_tokens)
}

/// Creates a strategy by name.
///
/// # Arguments
///
/// * `name` - Strategy name: "trivial", "structural", "paragraph", or "windowed".
///
/// # Errors
///
/// Returns [`SegmentationError::UnknownStrategy`] if the name is not recognized.
pub fn create_strategy(name: &str) -> Result<Box<dyn SegmentStrategy>, SegmentationError> {
    match name.to_lowercase().as_str() {
        "trivial" => Ok(Box::new(TrivialStrategy)),
        "structural" => Ok(Box::new(StructuralStrategy)),
        "paragraph" => Ok(Box::new(ParagraphStrategy)),
        "windowed" => Ok(Box::new(WindowedStrategy)),
        _ => Err(SegmentationError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

/// Lists available strategy names in priority order.
#[must_use]
pub fn available_strategies() -> Vec<&'static str> {
    vec!["trivial", "structural", "paragraph", "windowed"]
}
