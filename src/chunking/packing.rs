//! Greedy packing of pieces into maximal chunks.

use crate::chunking::windowed::WindowedStrategy;
use crate::core::ChunkBudget;
use crate::io::char_len;

/// Accumulates trimmed pieces into chunks no larger than the budget.
///
/// Pieces are joined with `separator`. A piece that alone exceeds the
/// budget flushes the buffer and is split by the windowed strategy; its
/// sub-segments are emitted directly.
///
/// # Examples
///
/// ```
/// use chunkstream::chunking::packing::pack;
/// use chunkstream::core::ChunkBudget;
///
/// let budget = ChunkBudget::new(12, 0).unwrap();
/// let chunks = pack(["alpha", "beta", "gamma"], &budget, "\n");
/// assert_eq!(chunks, vec!["alpha\nbeta".to_string(), "gamma".to_string()]);
/// ```
pub fn pack<'a, I>(pieces: I, budget: &ChunkBudget, separator: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let max = budget.max_size();
    let separator_chars = char_len(separator);
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;

    for piece in pieces {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        let piece_chars = char_len(trimmed);

        if piece_chars > max {
            flush(&mut chunks, &mut buffer, &mut buffer_chars);
            chunks.extend(WindowedStrategy::split_windows(trimmed, budget));
            continue;
        }

        let combined = if buffer.is_empty() {
            piece_chars
        } else {
            buffer_chars + separator_chars + piece_chars
        };

        if combined > max {
            flush(&mut chunks, &mut buffer, &mut buffer_chars);
        } else if !buffer.is_empty() {
            buffer.push_str(separator);
            buffer_chars += separator_chars;
        }
        buffer.push_str(trimmed);
        buffer_chars += piece_chars;
    }

    flush(&mut chunks, &mut buffer, &mut buffer_chars);
    chunks
}

fn flush(chunks: &mut Vec<String>, buffer: &mut String, buffer_chars: &mut usize) {
    if !buffer.is_empty() {
        chunks.push(std::mem::take(buffer));
        *buffer_chars = 0;
    }
}
