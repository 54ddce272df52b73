//! Error types for chunkstream operations.
//!
//! This module provides the error hierarchy using `thiserror` for
//! segmentation, request validation, transformation, event delivery,
//! I/O, and CLI commands.

use thiserror::Error;

/// Result type alias for chunkstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Segmentation-related errors (budget configuration).
    #[error("segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// Request validation errors (fatal for a session).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transformer errors (recoverable per segment).
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Event delivery errors (terminate a session).
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Segmentation-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentationError {
    /// Invalid chunk budget.
    #[error("invalid chunk budget: {reason}")]
    InvalidBudget {
        /// Reason the budget is invalid.
        reason: String,
    },

    /// Overlap must be strictly smaller than the segment ceiling.
    #[error("overlap {overlap} must be less than chunk size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Chunk size.
        size: usize,
    },

    /// Chunk size exceeds the supported ceiling.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Unknown segmentation strategy.
    #[error("unknown segmentation strategy: {name}")]
    UnknownStrategy {
        /// Strategy name that was not recognized.
        name: String,
    },
}

/// Request validation errors.
///
/// These abort a session before any segment is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Operation is not one of the supported kinds.
    #[error("operation must be \"transcribe\" or \"translate\", got \"{operation}\"")]
    UnsupportedOperation {
        /// The rejected operation name.
        operation: String,
    },

    /// Translation requested without a target language.
    #[error("a target language is required for translation")]
    MissingTargetLanguage,

    /// Per-job budget overrides are invalid.
    #[error("{0}")]
    InvalidBudget(#[from] SegmentationError),
}

/// Errors raised by a text transformer for a single segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Provider is missing credentials or endpoint configuration.
    #[error("{provider} is not configured: {reason}")]
    NotConfigured {
        /// Provider name.
        provider: String,
        /// What is missing.
        reason: String,
    },

    /// Request to the provider failed.
    #[error("request failed: {0}")]
    Request(String),

    /// Provider did not answer in time.
    #[error("request timed out after {seconds} seconds")]
    Timeout {
        /// Configured deadline.
        seconds: u64,
    },

    /// Provider answered without any content.
    #[error("no response received from {provider}")]
    EmptyResponse {
        /// Provider name.
        provider: String,
    },

    /// Provider answered with something unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Event delivery errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The receiving side went away.
    #[error("event receiver closed")]
    Closed,

    /// Writing an event to the transport failed.
    #[error("failed to write event: {0}")]
    Write(String),

    /// An event could not be encoded.
    #[error("failed to encode event: {0}")]
    Serialization(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        Self::Write(err.to_string())
    }
}
