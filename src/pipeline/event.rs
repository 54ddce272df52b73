//! Session events.
//!
//! Four event kinds make up the protocol. Each kind carries only its own
//! fields; wire names are camelCase.

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Progress report, emitted once after segmentation and once before each
/// segment is transformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Human-readable status.
    pub message: String,
    /// Number of segments in the session.
    pub total_chunks: usize,
    /// 1-based index of the segment about to be processed, 0 before any.
    pub current_chunk: usize,
    /// Rounded completion percentage (0..=100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
}

/// A segment was transformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkCompleteEvent {
    /// 1-based segment index.
    pub chunk_index: usize,
    /// Transformed text of this segment.
    pub result: String,
    /// All successful results so far, joined by a single space.
    pub partial_result: String,
}

/// A failure. Segment-scoped when `chunk_index` is present, session-level
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Human-readable cause.
    pub message: String,
    /// 1-based index of the failed segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
}

/// Terminal event of a session that ran to the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteEvent {
    /// Final accumulated output.
    pub result: String,
    /// Number of segments in the session.
    pub total_chunks: usize,
    /// Human-readable summary.
    pub message: String,
    /// 1-based indices of segments that failed.
    #[serde(default)]
    pub failed_chunks: Vec<usize>,
}

/// One event of the session protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessEvent {
    /// Progress report.
    Progress(ProgressEvent),
    /// Partial result.
    ChunkComplete(ChunkCompleteEvent),
    /// Failure report.
    Error(ErrorEvent),
    /// Completion.
    Complete(CompleteEvent),
}

impl ProcessEvent {
    /// Returns the protocol name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::ChunkComplete(_) => "chunk_complete",
            Self::Error(_) => "error",
            Self::Complete(_) => "complete",
        }
    }

    /// Returns true for events that end a session: completion, or an error
    /// not scoped to a segment.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::Complete(_) => true,
            Self::Error(e) => e.chunk_index.is_none(),
            Self::Progress(_) | Self::ChunkComplete(_) => false,
        }
    }

    /// Serializes the payload without the kind tag.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Serialization`] if encoding fails.
    pub fn payload_json(&self) -> Result<String, ChannelError> {
        let json = match self {
            Self::Progress(e) => serde_json::to_string(e)?,
            Self::ChunkComplete(e) => serde_json::to_string(e)?,
            Self::Error(e) => serde_json::to_string(e)?,
            Self::Complete(e) => serde_json::to_string(e)?,
        };
        Ok(json)
    }
}

/// An event stamped with its position in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Monotonically increasing sequence number, starting at 1.
    pub sequence: u64,
    /// The event.
    #[serde(flatten)]
    pub event: ProcessEvent,
}

/// Rounded percentage of `current` over `total`.
#[must_use]
pub fn percentage(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (current.min(total) * 100 + total / 2) / total;
    u8::try_from(pct).unwrap_or(100)
}
