//! Processing session state.
//!
//! A session owns the accumulated output and the event sequence for one
//! job. It is created at job start and consumed into a [`SessionReport`].

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::event::{ErrorEvent, ProcessEvent, SessionEvent};
use super::sink::EventSink;
use crate::error::{ChannelError, Error, Result};

/// State of a processing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Created, request not yet validated.
    Initialized,
    /// Request valid, text being segmented.
    Segmenting,
    /// Transforming the segment with this 1-based index.
    Processing {
        /// Current segment index.
        current: usize,
    },
    /// Every segment was attempted and the completion event emitted.
    Completed,
    /// Stopped by a cancellation request.
    Cancelled,
    /// Rejected before any segment was produced.
    Failed {
        /// Error reason.
        reason: String,
    },
}

impl SessionState {
    /// Check if state is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed { .. })
    }

    /// Returns true if moving to `next` is allowed for a session with
    /// `total` segments.
    #[must_use]
    pub const fn can_transition_to(&self, next: &Self, total: usize) -> bool {
        match (self, next) {
            (Self::Initialized, Self::Segmenting | Self::Failed { .. })
            | (Self::Segmenting, Self::Failed { .. })
            | (Self::Processing { .. }, Self::Cancelled) => true,
            (Self::Segmenting, Self::Processing { current }) => *current == 1,
            (Self::Processing { current }, Self::Processing { current: following }) => {
                *following == *current + 1 && *following <= total
            }
            (Self::Processing { current }, Self::Completed) => *current == total,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => f.write_str("initialized"),
            Self::Segmenting => f.write_str("segmenting"),
            Self::Processing { current } => write!(f, "processing({current})"),
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcome of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Final state.
    pub state: SessionState,
    /// Accumulated output of successful segments.
    pub result: String,
    /// Number of segments produced.
    pub total_segments: usize,
    /// 1-based indices of failed segments.
    pub failed_segments: Vec<usize>,
    /// Number of events delivered.
    pub events_emitted: u64,
}

impl SessionReport {
    /// Returns true if the session completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }
}

/// Per-job state machine, accumulator, and event sequencer.
pub struct Session<'a, S: EventSink + ?Sized> {
    sink: &'a mut S,
    state: SessionState,
    total: usize,
    accumulator: String,
    successes: usize,
    failed: Vec<usize>,
    sequence: u64,
}

impl<'a, S: EventSink + ?Sized> Session<'a, S> {
    /// Creates a session delivering events to `sink`.
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            state: SessionState::Initialized,
            total: 0,
            accumulator: String::new(),
            successes: 0,
            failed: Vec::new(),
            sequence: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the number of segments.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Sets the number of segments once segmentation is done.
    pub const fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Returns the failed segment indices so far.
    #[must_use]
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    /// Returns the accumulated output so far.
    #[must_use]
    pub fn accumulated(&self) -> &str {
        &self.accumulator
    }

    /// Moves to the next state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] for a transition the state machine
    /// does not allow.
    pub fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_transition_to(&next, self.total) {
            return Err(Error::InvalidState {
                message: format!("cannot move session from {} to {next}", self.state),
            });
        }
        debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
        Ok(())
    }

    /// Stamps and delivers an event.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] if the sink rejects the event.
    pub async fn emit(&mut self, event: ProcessEvent) -> std::result::Result<(), ChannelError> {
        let sequence = self.sequence + 1;
        self.sink.send(SessionEvent { sequence, event }).await?;
        self.sequence = sequence;
        Ok(())
    }

    /// Appends a successful result, separated by a single space from any
    /// earlier success, and returns the accumulated output.
    pub fn record_success(&mut self, result: &str) -> &str {
        if self.successes > 0 {
            self.accumulator.push(' ');
        }
        self.accumulator.push_str(result);
        self.successes += 1;
        &self.accumulator
    }

    /// Records a failed segment.
    pub fn record_failure(&mut self, index: usize) {
        self.failed.push(index);
    }

    /// Fails the session and emits a single unscoped error event.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed or the event
    /// cannot be delivered.
    pub async fn fail(&mut self, reason: String) -> Result<()> {
        self.transition(SessionState::Failed {
            reason: reason.clone(),
        })?;
        self.emit(ProcessEvent::Error(ErrorEvent {
            message: reason,
            chunk_index: None,
        }))
        .await?;
        Ok(())
    }

    /// Consumes the session into its report.
    #[must_use]
    pub fn report(self) -> SessionReport {
        SessionReport {
            state: self.state,
            result: self.accumulator,
            total_segments: self.total,
            failed_segments: self.failed,
            events_emitted: self.sequence,
        }
    }
}
