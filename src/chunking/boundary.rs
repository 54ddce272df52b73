//! Boundary scoring for windowed cuts.
//!
//! Ranks candidate cut positions inside a window by boundary quality and
//! picks the best one that still leaves a reasonably full segment.

use crate::io::unicode::floor_grapheme_boundary;
use serde::Serialize;

/// Priority class of a textual cut point, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryTier {
    /// A period followed by a space or newline.
    SentenceEnd,
    /// A blank line.
    ParagraphBreak,
    /// A question or exclamation mark.
    ClausePunctuation,
    /// A single newline.
    LineBreak,
    /// A plain space.
    Space,
}

impl BoundaryTier {
    /// All tiers in priority order.
    pub const ALL: [Self; 5] = [
        Self::SentenceEnd,
        Self::ParagraphBreak,
        Self::ClausePunctuation,
        Self::LineBreak,
        Self::Space,
    ];

    /// Integer rank of the tier; lower is better.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::SentenceEnd => 0,
            Self::ParagraphBreak => 1,
            Self::ClausePunctuation => 2,
            Self::LineBreak => 3,
            Self::Space => 4,
        }
    }

    /// Returns the tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SentenceEnd => "sentence_end",
            Self::ParagraphBreak => "paragraph_break",
            Self::ClausePunctuation => "clause_punctuation",
            Self::LineBreak => "line_break",
            Self::Space => "space",
        }
    }

    /// Markers recognized by this tier. The cut falls right after the
    /// first character of the marker.
    const fn markers(self) -> &'static [&'static str] {
        match self {
            Self::SentenceEnd => &[". ", ".\n"],
            Self::ParagraphBreak => &["\n\n"],
            Self::ClausePunctuation => &["?", "!"],
            Self::LineBreak => &["\n"],
            Self::Space => &[" "],
        }
    }

    /// Finds the last cut offset of this tier inside `[start, end)`.
    ///
    /// A marker may straddle `end` as long as the cut itself does not pass it.
    fn last_cut(self, text: &str, start: usize, end: usize) -> Option<usize> {
        self.markers()
            .iter()
            .filter_map(|marker| {
                let mut search_end = (end + marker.len() - 1).min(text.len());
                if !text.is_char_boundary(search_end) {
                    search_end = end;
                }
                text[start..search_end]
                    .rfind(marker)
                    .map(|pos| start + pos + 1)
            })
            .max()
    }
}

impl std::fmt::Display for BoundaryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate cut position with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutCandidate {
    /// Byte offset of the cut (exclusive end of the segment).
    pub position: usize,
    /// Tier of the boundary that produced this candidate.
    pub tier: BoundaryTier,
}

/// How a cut was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// At a textual boundary of the given tier.
    Semantic(BoundaryTier),
    /// At the window edge, because no acceptable boundary existed.
    Forced,
}

/// A chosen cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    /// Byte offset of the cut.
    pub offset: usize,
    /// How the cut was found.
    pub kind: CutKind,
}

impl Cut {
    /// Returns true if the cut landed on a textual boundary.
    #[must_use]
    pub const fn is_semantic(&self) -> bool {
        matches!(self.kind, CutKind::Semantic(_))
    }
}

/// Selects cut points inside a window.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryScorer;

impl BoundaryScorer {
    /// Collects the best candidate of each tier within `[start, end)`, in
    /// tier order. Within a tier the candidate closest to `end` is kept.
    ///
    /// All offsets are byte offsets on character boundaries.
    #[must_use]
    pub fn candidates(text: &str, start: usize, end: usize) -> Vec<CutCandidate> {
        if start >= end {
            return Vec::new();
        }
        BoundaryTier::ALL
            .iter()
            .filter_map(|&tier| {
                tier.last_cut(text, start, end)
                    .map(|position| CutCandidate { position, tier })
            })
            .collect()
    }

    /// Finds the best cut in `[start, end]`.
    ///
    /// The first candidate by tier whose position is at or after
    /// `min_acceptable` wins. Without one, the cut is forced at `end`,
    /// moved back to the nearest grapheme boundary when possible.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkstream::chunking::boundary::{BoundaryScorer, BoundaryTier, CutKind};
    ///
    /// let text = "One two. Three four five six";
    /// let cut = BoundaryScorer::find_cut(text, 0, 20, 5);
    /// assert_eq!(cut.offset, 8);
    /// assert_eq!(cut.kind, CutKind::Semantic(BoundaryTier::SentenceEnd));
    /// ```
    #[must_use]
    pub fn find_cut(text: &str, start: usize, end: usize, min_acceptable: usize) -> Cut {
        Self::candidates(text, start, end)
            .into_iter()
            .find(|candidate| candidate.position >= min_acceptable)
            .map_or_else(
                || Cut {
                    offset: floor_grapheme_boundary(text, start, end),
                    kind: CutKind::Forced,
                },
                |candidate| Cut {
                    offset: candidate.position,
                    kind: CutKind::Semantic(candidate.tier),
                },
            )
    }
}
