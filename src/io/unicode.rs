//! Unicode utilities for text processing.
//!
//! Budgets are expressed in characters while string slicing works on bytes.
//! These helpers translate between the two and keep every cut on a valid
//! character (and, where possible, grapheme cluster) boundary.

use unicode_segmentation::UnicodeSegmentation;

/// Returns the length of a string in characters.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Returns the byte offset reached by moving `n` characters forward from
/// the byte offset `from`, clamped to the end of the string.
///
/// `from` must be a character boundary.
///
/// # Examples
///
/// ```
/// use chunkstream::io::unicode::advance_chars;
///
/// let s = "añb";
/// assert_eq!(advance_chars(s, 0, 2), 3);
/// assert_eq!(advance_chars(s, 0, 10), s.len());
/// ```
#[must_use]
pub fn advance_chars(s: &str, from: usize, n: usize) -> usize {
    s[from..]
        .char_indices()
        .nth(n)
        .map_or(s.len(), |(offset, _)| from + offset)
}

/// Returns the byte offset reached by moving `n` characters backward from
/// the byte offset `to`, clamped to the start of the string.
///
/// `to` must be a character boundary.
#[must_use]
pub fn retreat_chars(s: &str, to: usize, n: usize) -> usize {
    if n == 0 {
        return to;
    }
    s[..to]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(offset, _)| offset)
}

/// Truncates a string to at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    &s[..advance_chars(s, 0, max_chars)]
}

/// Finds the last grapheme cluster boundary in `(lo, pos]`.
///
/// Graphemes are measured from `lo`. When no boundary exists in the range
/// (a single cluster wider than the range), `pos` is returned unchanged so
/// callers still make progress.
///
/// # Examples
///
/// ```
/// use chunkstream::io::unicode::floor_grapheme_boundary;
///
/// // "e" followed by a combining acute accent forms one cluster.
/// let s = "abe\u{301}cd";
/// assert_eq!(floor_grapheme_boundary(s, 0, 3), 2);
/// ```
#[must_use]
pub fn floor_grapheme_boundary(s: &str, lo: usize, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let mut best = None;
    for (offset, _) in s[lo..].grapheme_indices(true) {
        let boundary = lo + offset;
        if boundary > pos {
            break;
        }
        if boundary > lo {
            best = Some(boundary);
        }
    }
    best.unwrap_or(pos)
}

/// Validates that a byte slice is valid UTF-8.
///
/// # Errors
///
/// Returns the byte offset of the first invalid UTF-8 sequence.
pub fn validate_utf8(bytes: &[u8]) -> std::result::Result<&str, usize> {
    std::str::from_utf8(bytes).map_err(|e| e.valid_up_to())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len() {
        assert_eq!(char_len(""), 0);
        assert_eq!(char_len("Hello"), 5);
        assert_eq!(char_len("世界"), 2);
    }

    #[test]
    fn test_advance_chars() {
        let s = "Hello 世界!";
        assert_eq!(advance_chars(s, 0, 0), 0);
        assert_eq!(advance_chars(s, 0, 6), 6);
        assert_eq!(advance_chars(s, 0, 7), 9);
        assert_eq!(advance_chars(s, 6, 2), 12);
        assert_eq!(advance_chars(s, 6, 50), s.len());
        assert_eq!(advance_chars(s, s.len(), 3), s.len());
    }

    #[test]
    fn test_retreat_chars() {
        let s = "Hello 世界!";
        assert_eq!(retreat_chars(s, 12, 0), 12);
        assert_eq!(retreat_chars(s, 12, 1), 9);
        assert_eq!(retreat_chars(s, 12, 2), 6);
        assert_eq!(retreat_chars(s, 12, 100), 0);
        assert_eq!(retreat_chars(s, 0, 1), 0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Hello", 3), "Hel");
        assert_eq!(truncate_chars("世界!", 2), "世界");
        assert_eq!(truncate_chars("Hello", 10), "Hello");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_floor_grapheme_boundary_plain() {
        let s = "abcdef";
        assert_eq!(floor_grapheme_boundary(s, 0, 3), 3);
        assert_eq!(floor_grapheme_boundary(s, 2, 4), 4);
        assert_eq!(floor_grapheme_boundary(s, 0, 100), s.len());
    }

    #[test]
    fn test_floor_grapheme_boundary_combining_mark() {
        // 'e' (byte 2) + U+0301 (bytes 3..5) is one cluster.
        let s = "abe\u{301}cd";
        assert_eq!(floor_grapheme_boundary(s, 0, 3), 2);
        assert_eq!(floor_grapheme_boundary(s, 0, 5), 5);
    }

    #[test]
    fn test_floor_grapheme_boundary_single_wide_cluster() {
        // A family emoji is a single cluster; inside it there is no boundary
        // after lo, so the position is returned as-is.
        let s = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}tail";
        let inside = 4;
        assert_eq!(floor_grapheme_boundary(s, 0, inside), inside);
    }

    #[test]
    fn test_validate_utf8() {
        assert!(validate_utf8(b"Hello").is_ok());
        assert!(validate_utf8("世界".as_bytes()).is_ok());

        let invalid = [b'o', b'k', 0xFF, 0xFE];
        assert_eq!(validate_utf8(&invalid), Err(2));
    }
}
