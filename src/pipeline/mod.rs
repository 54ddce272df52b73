//! Streaming transformation pipeline.
//!
//! A request is validated, segmented, and each segment transformed in
//! order. Progress, partial results, and failures are delivered to an
//! [`EventSink`] as they happen:
//!
//! ```text
//! progress(split) -> [progress(i) -> chunk_complete(i) | error(i)]* -> complete
//! ```

pub mod cancel;
pub mod event;
pub mod orchestrator;
pub mod request;
pub mod session;
pub mod sink;

pub use cancel::{CancelHandle, CancelToken, cancellation};
pub use event::{
    ChunkCompleteEvent, CompleteEvent, ErrorEvent, ProcessEvent, ProgressEvent, SessionEvent,
    percentage,
};
pub use orchestrator::Orchestrator;
pub use request::{ProcessRequest, RequestOptions, ValidatedRequest};
pub use session::{Session, SessionReport, SessionState};
pub use sink::{
    ChannelSink, DEFAULT_CHANNEL_CAPACITY, EventSink, NdjsonWriter, SseWriter, event_channel,
    forward, sse_frame,
};
