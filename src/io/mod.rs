//! I/O utilities.
//!
//! Provides document reading with memory mapping support for large files,
//! segment writing, and Unicode offset helpers used by the segmenter.

pub mod reader;
pub mod unicode;

pub use reader::{
    DocumentReader, InputSource, MMAP_THRESHOLD, ReadMode, STDIN_PATH, read_input,
    segment_file_name, write_file, write_segments,
};
pub use unicode::{char_len, validate_utf8};
