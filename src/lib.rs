//! # chunkstream
//!
//! Adaptive segmentation and streaming transformation of long texts.
//!
//! chunkstream splits a document that exceeds a language model's context
//! into bounded segments at natural boundaries, transforms each segment
//! (transcription with correction, or translation) in order, and streams
//! progress, partial results, and failures as events.
//!
//! ## Features
//!
//! - **Segmentation**: Structural, paragraph, and windowed strategies with a
//!   ranked boundary scorer
//! - **Streaming Pipeline**: Ordered per-segment processing with progress,
//!   partial result, error, and completion events
//! - **Failure Isolation**: A failed segment is reported and skipped
//! - **Pluggable Backends**: OpenAI-compatible provider and an offline demo
//! - **Unicode Aware**: Character budgets and grapheme-safe forced cuts
//!
//! ## Example
//!
//! ```
//! use chunkstream::core::ChunkBudget;
//! use chunkstream::chunking::segment;
//!
//! let text = "Hello world. ".repeat(2000);
//! let segments = segment(&text, &ChunkBudget::default());
//! assert!(segments.iter().all(|s| s.char_count() <= 12_000));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod chunking;
pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod transform;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{ChunkBudget, Segment, estimate_tokens};

// Re-export chunking types
pub use chunking::{
    BoundaryScorer, BoundaryTier, SegmentStrategy, Segmenter, available_strategies,
    create_strategy, enforce_token_limit, segment,
};

// Re-export transform types
pub use transform::{
    DemoTransformer, Operation, Provider, ProviderConfig, TransformOptions, Transformer,
    create_transformer,
};

// Re-export pipeline types
pub use pipeline::{
    CancelHandle, CancelToken, EventSink, Orchestrator, ProcessEvent, ProcessRequest,
    SessionEvent, SessionReport, SessionState, cancellation,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
