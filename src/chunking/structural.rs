//! Structural segmentation strategy.
//!
//! Detects document structure (headers, chapter markers, rules) and cuts
//! the text right before each marker, so every section keeps its heading.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::chunking::packing::pack;
use crate::chunking::traits::SegmentStrategy;
use crate::core::ChunkBudget;
use crate::io::char_len;

/// Trimmed length a piece must exceed to count as a real section.
const MIN_SECTION_CHARS: usize = 100;

/// Number of real sections a pattern must produce to be used.
const MIN_SECTIONS: usize = 2;

/// Structural boundary patterns, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralPattern {
    /// Markdown headers (`#` through `######`).
    MarkdownHeader,
    /// Numbered chapter lines such as `1. Introduction to the topic`.
    NumberedChapter,
    /// All-caps title lines.
    AllCapsTitle,
    /// Horizontal rules of five or more dashes.
    DashRule,
    /// Horizontal rules of five or more equals signs.
    EqualsRule,
    /// `Chapter N` or `Capítulo N`.
    ChapterMarker,
    /// `Section N`.
    SectionMarker,
    /// `Part N` or `Parte N`.
    PartMarker,
}

impl StructuralPattern {
    /// All patterns in detection order.
    pub const ALL: [Self; 8] = [
        Self::MarkdownHeader,
        Self::NumberedChapter,
        Self::AllCapsTitle,
        Self::DashRule,
        Self::EqualsRule,
        Self::ChapterMarker,
        Self::SectionMarker,
        Self::PartMarker,
    ];

    /// Returns the pattern name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MarkdownHeader => "markdown_header",
            Self::NumberedChapter => "numbered_chapter",
            Self::AllCapsTitle => "all_caps_title",
            Self::DashRule => "dash_rule",
            Self::EqualsRule => "equals_rule",
            Self::ChapterMarker => "chapter_marker",
            Self::SectionMarker => "section_marker",
            Self::PartMarker => "part_marker",
        }
    }

    /// Returns the compiled regex for this pattern.
    #[allow(clippy::expect_used)]
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::MarkdownHeader => static_regex!(MARKDOWN_HEADER, r"(?m)^#{1,6}[ \t]+\S"),
            Self::NumberedChapter => {
                static_regex!(NUMBERED_CHAPTER, r"(?m)^\d+\.[ \t]+[A-Z][^.\n]{10,}")
            }
            Self::AllCapsTitle => static_regex!(ALL_CAPS_TITLE, r"(?m)^[A-Z][A-Z \t]{8,}\r?$"),
            Self::DashRule => static_regex!(DASH_RULE, r"(?m)^-{5,}[ \t]*\r?$"),
            Self::EqualsRule => static_regex!(EQUALS_RULE, r"(?m)^={5,}[ \t]*\r?$"),
            Self::ChapterMarker => {
                static_regex!(CHAPTER_MARKER, r"(?mi)^(?:chapter|cap[ií]tulo)[ \t]+\d+")
            }
            Self::SectionMarker => static_regex!(SECTION_MARKER, r"(?mi)^section[ \t]+\d+"),
            Self::PartMarker => static_regex!(PART_MARKER, r"(?mi)^parte?[ \t]+\d+"),
        }
    }

    /// Splits the text right before every match of this pattern.
    ///
    /// The pieces concatenate back to the original text.
    #[must_use]
    pub fn split<'t>(self, text: &'t str) -> Vec<&'t str> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for found in self.regex().find_iter(text) {
            if found.start() > last {
                pieces.push(&text[last..found.start()]);
                last = found.start();
            }
        }
        pieces.push(&text[last..]);
        pieces
    }

    /// Returns true if this pattern divides the text into enough real sections.
    #[must_use]
    pub fn detects(self, pieces: &[&str]) -> bool {
        pieces
            .iter()
            .filter(|piece| char_len(piece.trim()) > MIN_SECTION_CHARS)
            .count()
            >= MIN_SECTIONS
    }
}

/// Structural segmentation strategy.
///
/// Uses the first pattern that yields at least two sections of more than
/// 100 characters, then packs sections greedily with a newline separator.
/// Declines when no pattern qualifies or packing yields a single chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStrategy;

impl StructuralStrategy {
    /// Returns the first pattern that detects structure, with its pieces.
    #[must_use]
    pub fn detect(text: &str) -> Option<(StructuralPattern, Vec<&str>)> {
        StructuralPattern::ALL.iter().find_map(|&pattern| {
            let pieces = pattern.split(text);
            pattern.detects(&pieces).then_some((pattern, pieces))
        })
    }
}

impl SegmentStrategy for StructuralStrategy {
    fn split(&self, text: &str, budget: &ChunkBudget) -> Option<Vec<String>> {
        let (pattern, pieces) = Self::detect(text)?;
        let chunks = pack(pieces, budget, "\n");
        let within_budget = chunks
            .iter()
            .all(|chunk| char_len(chunk) <= budget.max_size());

        debug!(
            pattern = pattern.name(),
            chunks = chunks.len(),
            within_budget,
            "structural pattern detected"
        );

        (chunks.len() > 1 && within_budget).then_some(chunks)
    }

    fn name(&self) -> &'static str {
        "structural"
    }

    fn description(&self) -> &'static str {
        "Cuts at headers, chapter markers, title lines, and horizontal rules"
    }
}
