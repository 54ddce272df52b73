//! Core domain models.
//!
//! Value types shared by the segmenter and the pipeline: segments and the
//! chunk budget. These are pure domain models with no I/O dependencies.

pub mod budget;
pub mod segment;

pub use budget::{ChunkBudget, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP, MAX_CHUNK_SIZE};
pub use segment::{Segment, estimate_tokens};
