//! Chunk budget configuration.
//!
//! The budget bounds segmentation: a character ceiling per segment and the
//! amount of trailing context repeated into the following window by the
//! windowed fallback strategy.

use serde::{Deserialize, Serialize};

use crate::error::SegmentationError;

/// Default segment ceiling in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 12_000;

/// Default overlap in characters between windowed segments.
pub const DEFAULT_OVERLAP: usize = 50;

/// Largest accepted segment ceiling (1M characters).
pub const MAX_CHUNK_SIZE: usize = 1_000_000;

/// Segmentation budget.
///
/// Invariant: `0 <= overlap < max_size`. Construct through [`ChunkBudget::new`]
/// to have it checked.
///
/// # Examples
///
/// ```
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(1000, 50).unwrap();
/// assert_eq!(budget.max_size(), 1000);
/// assert!(ChunkBudget::new(100, 100).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkBudget {
    max_size: usize,
    overlap: usize,
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkBudget {
    /// Creates a validated budget.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_size` is zero or above [`MAX_CHUNK_SIZE`], or
    /// if `overlap >= max_size`.
    pub fn new(max_size: usize, overlap: usize) -> Result<Self, SegmentationError> {
        if max_size == 0 {
            return Err(SegmentationError::InvalidBudget {
                reason: "max_size must be > 0".to_string(),
            });
        }
        if max_size > MAX_CHUNK_SIZE {
            return Err(SegmentationError::ChunkTooLarge {
                size: max_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        if overlap >= max_size {
            return Err(SegmentationError::OverlapTooLarge {
                overlap,
                size: max_size,
            });
        }
        Ok(Self { max_size, overlap })
    }

    /// Creates a budget with the given ceiling and no overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_size` is out of range.
    pub fn with_size(max_size: usize) -> Result<Self, SegmentationError> {
        Self::new(max_size, 0)
    }

    /// Creates a budget from optional per-job overrides, falling back to the
    /// defaults for missing values.
    ///
    /// A defaulted overlap shrinks to fit a small ceiling; an explicit
    /// overlap is never adjusted.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting budget is invalid.
    pub fn from_overrides(
        max_size: Option<usize>,
        overlap: Option<usize>,
    ) -> Result<Self, SegmentationError> {
        let max_size = max_size.unwrap_or(DEFAULT_MAX_CHUNK_SIZE);
        let overlap = overlap.unwrap_or_else(|| DEFAULT_OVERLAP.min(max_size.saturating_sub(1)));
        Self::new(max_size, overlap)
    }

    /// Segment ceiling in characters.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Overlap in characters.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Smallest acceptable distance, in characters, from a window start to a
    /// semantic cut (75% of the ceiling).
    #[must_use]
    pub const fn min_cut_distance(&self) -> usize {
        self.max_size * 3 / 4
    }

    /// Minimum advance, in characters, between consecutive window starts
    /// (95% of the ceiling).
    #[must_use]
    pub const fn min_advance(&self) -> usize {
        self.max_size * 95 / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_defaults() {
        let budget = ChunkBudget::default();
        assert_eq!(budget.max_size(), DEFAULT_MAX_CHUNK_SIZE);
        assert_eq!(budget.overlap(), DEFAULT_OVERLAP);
    }

    #[test]
    fn test_budget_zero_size() {
        let result = ChunkBudget::new(0, 0);
        assert!(matches!(
            result,
            Err(SegmentationError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn test_budget_overlap_too_large() {
        let result = ChunkBudget::new(50, 50);
        assert_eq!(
            result,
            Err(SegmentationError::OverlapTooLarge {
                overlap: 50,
                size: 50
            })
        );
    }

    #[test]
    fn test_budget_too_large() {
        let result = ChunkBudget::new(MAX_CHUNK_SIZE + 1, 0);
        assert!(matches!(
            result,
            Err(SegmentationError::ChunkTooLarge { .. })
        ));
    }

    #[test]
    fn test_budget_with_size() {
        let budget = ChunkBudget::with_size(10).unwrap();
        assert_eq!(budget.overlap(), 0);
    }

    #[test]
    fn test_budget_from_overrides() {
        let budget = ChunkBudget::from_overrides(None, None).unwrap();
        assert_eq!(budget, ChunkBudget::default());

        let budget = ChunkBudget::from_overrides(Some(500), Some(10)).unwrap();
        assert_eq!(budget.max_size(), 500);
        assert_eq!(budget.overlap(), 10);

        // Defaulted overlap shrinks to fit a tiny ceiling.
        let budget = ChunkBudget::from_overrides(Some(20), None).unwrap();
        assert_eq!(budget.overlap(), 19);

        // Explicit overlap is never adjusted.
        assert!(ChunkBudget::from_overrides(Some(20), Some(20)).is_err());
    }

    #[test]
    fn test_budget_thresholds() {
        let budget = ChunkBudget::new(12_000, 50).unwrap();
        assert_eq!(budget.min_cut_distance(), 9_000);
        assert_eq!(budget.min_advance(), 11_400);

        let budget = ChunkBudget::with_size(1).unwrap();
        assert_eq!(budget.min_cut_distance(), 0);
        assert_eq!(budget.min_advance(), 0);
    }
}
