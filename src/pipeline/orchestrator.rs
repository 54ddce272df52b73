//! Pipeline orchestrator.
//!
//! Drives one session: validates the request, segments the text, then
//! transforms segments strictly in order, emitting events as it goes. A
//! failed segment is reported and skipped; it never aborts the session.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, instrument, warn};

use super::cancel::CancelToken;
use super::event::{
    ChunkCompleteEvent, CompleteEvent, ErrorEvent, ProcessEvent, ProgressEvent, SessionEvent,
    percentage,
};
use super::request::ProcessRequest;
use super::session::{Session, SessionReport, SessionState};
use super::sink::{DEFAULT_CHANNEL_CAPACITY, EventSink, event_channel};
use crate::chunking::Segmenter;
use crate::core::ChunkBudget;
use crate::error::Result;
use crate::transform::{Operation, TransformOptions, Transformer};

/// Sequential segment-transformation pipeline.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chunkstream::pipeline::{CancelToken, Orchestrator, ProcessRequest, SessionEvent};
/// use chunkstream::transform::DemoTransformer;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let orchestrator = Orchestrator::new(Arc::new(DemoTransformer::new()));
/// let mut events: Vec<SessionEvent> = Vec::new();
/// let report = rt
///     .block_on(orchestrator.run(
///         &ProcessRequest::new("Hello there.", "transcribe"),
///         &mut events,
///         &CancelToken::never(),
///     ))
///     .unwrap();
/// assert!(report.is_completed());
/// assert_eq!(events.last().map(|e| e.event.name()), Some("complete"));
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    transformer: Arc<dyn Transformer>,
    segmenter: Arc<Segmenter>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("transformer", &self.transformer.name())
            .field("segmenter", &self.segmenter)
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with the default segmenter.
    #[must_use]
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self {
            transformer,
            segmenter: Arc::new(Segmenter::new()),
        }
    }

    /// Replaces the segmenter.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = Arc::new(segmenter);
        self
    }

    /// Returns the transformer backend name.
    #[must_use]
    pub fn transformer_name(&self) -> &'static str {
        self.transformer.name()
    }

    /// Runs a session for a wire request.
    ///
    /// A request that fails validation ends in [`SessionState::Failed`]
    /// after a single unscoped error event.
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be delivered to the sink.
    #[instrument(skip_all, fields(operation = %request.operation, chars = request.text.len()))]
    pub async fn run<S>(
        &self,
        request: &ProcessRequest,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<SessionReport>
    where
        S: EventSink + ?Sized,
    {
        let mut session = Session::new(sink);

        let job = match request.validate() {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "request rejected");
                session.fail(e.to_string()).await?;
                return Ok(session.report());
            }
        };

        self.drive(
            session,
            &request.text,
            &job.operation,
            &job.budget,
            &job.options,
            cancel,
        )
        .await
    }

    /// Runs a session for an already validated operation.
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be delivered to the sink.
    pub async fn run_text<S>(
        &self,
        text: &str,
        operation: &Operation,
        budget: &ChunkBudget,
        options: &TransformOptions,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<SessionReport>
    where
        S: EventSink + ?Sized,
    {
        self.drive(Session::new(sink), text, operation, budget, options, cancel)
            .await
    }

    /// Runs a session on a background task, exposing its events as a stream.
    ///
    /// Dropping the stream stops the session at its next event.
    #[must_use]
    pub fn spawn(
        &self,
        request: ProcessRequest,
        cancel: CancelToken,
    ) -> (ReceiverStream<SessionEvent>, JoinHandle<Result<SessionReport>>) {
        let (mut sink, stream) = event_channel(DEFAULT_CHANNEL_CAPACITY);
        let orchestrator = self.clone();
        let handle =
            tokio::spawn(async move { orchestrator.run(&request, &mut sink, &cancel).await });
        (stream, handle)
    }

    async fn drive<S>(
        &self,
        mut session: Session<'_, S>,
        text: &str,
        operation: &Operation,
        budget: &ChunkBudget,
        options: &TransformOptions,
        cancel: &CancelToken,
    ) -> Result<SessionReport>
    where
        S: EventSink + ?Sized,
    {
        session.transition(SessionState::Segmenting)?;
        let segments = self.segmenter.segment(text, budget);
        let total = segments.len();
        session.set_total(total);

        info!(
            segments = total,
            transformer = self.transformer.name(),
            %operation,
            "session started"
        );

        session
            .emit(ProcessEvent::Progress(ProgressEvent {
                message: format!("Text split into {total} segments"),
                total_chunks: total,
                current_chunk: 0,
                percentage: None,
            }))
            .await?;

        for segment in &segments {
            let index = segment.index;
            session.transition(SessionState::Processing { current: index })?;

            if cancel.is_cancelled() {
                return Self::cancel(session);
            }

            session
                .emit(ProcessEvent::Progress(ProgressEvent {
                    message: format!("Processing segment {index} of {total}"),
                    total_chunks: total,
                    current_chunk: index,
                    percentage: Some(percentage(index, total)),
                }))
                .await?;

            let outcome = self
                .transformer
                .transform(&segment.content, operation, options)
                .await;

            if cancel.is_cancelled() {
                return Self::cancel(session);
            }

            match outcome {
                Ok(result) => {
                    let partial_result = session.record_success(&result).to_string();
                    session
                        .emit(ProcessEvent::ChunkComplete(ChunkCompleteEvent {
                            chunk_index: index,
                            result,
                            partial_result,
                        }))
                        .await?;
                }
                Err(e) => {
                    warn!(segment = index, error = %e, "segment failed, continuing");
                    session.record_failure(index);
                    session
                        .emit(ProcessEvent::Error(ErrorEvent {
                            message: format!("Error in segment {index}: {e}"),
                            chunk_index: Some(index),
                        }))
                        .await?;
                }
            }
        }

        session.transition(SessionState::Completed)?;

        let failed = session.failed().to_vec();
        let message = if failed.is_empty() {
            "Processing completed successfully".to_string()
        } else {
            format!("Processing completed with {} failed segment(s)", failed.len())
        };
        info!(segments = total, failed = failed.len(), "session completed");

        let result = session.accumulated().to_string();
        session
            .emit(ProcessEvent::Complete(CompleteEvent {
                result,
                total_chunks: total,
                message,
                failed_chunks: failed,
            }))
            .await?;

        Ok(session.report())
    }

    fn cancel<S>(mut session: Session<'_, S>) -> Result<SessionReport>
    where
        S: EventSink + ?Sized,
    {
        session.transition(SessionState::Cancelled)?;
        warn!("session cancelled");
        Ok(session.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChannelError, TransformError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes input, failing on segments containing a marker.
    struct EchoTransformer {
        fail_marker: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl EchoTransformer {
        fn new() -> Self {
            Self {
                fail_marker: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(marker: &'static str) -> Self {
            Self {
                fail_marker: Some(marker),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transformer for EchoTransformer {
        async fn transform(
            &self,
            text: &str,
            _operation: &Operation,
            _options: &TransformOptions,
        ) -> std::result::Result<String, TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = self.fail_marker
                && text.contains(marker)
            {
                return Err(TransformError::Request("provider unavailable".to_string()));
            }
            Ok(format!("<{text}>"))
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    /// Cancels after the first transformer call.
    struct CancellingTransformer {
        handle: Mutex<Option<crate::pipeline::CancelHandle>>,
    }

    #[async_trait]
    impl Transformer for CancellingTransformer {
        async fn transform(
            &self,
            text: &str,
            _operation: &Operation,
            _options: &TransformOptions,
        ) -> std::result::Result<String, TransformError> {
            if let Some(handle) = self.handle.lock().unwrap().take() {
                handle.cancel();
            }
            Ok(text.to_string())
        }

        fn name(&self) -> &'static str {
            "cancelling"
        }
    }

    /// Sink that fails after accepting a number of events.
    struct FlakySink {
        remaining: usize,
    }

    #[async_trait]
    impl EventSink for FlakySink {
        async fn send(&mut self, _event: SessionEvent) -> std::result::Result<(), ChannelError> {
            if self.remaining == 0 {
                return Err(ChannelError::Closed);
            }
            self.remaining -= 1;
            Ok(())
        }
    }

    fn three_paragraphs() -> ProcessRequest {
        let mut request = ProcessRequest::new(
            "alpha alpha\n\nbravo bravo\n\ncharlie charlie",
            "transcribe",
        );
        request.options.max_chunk_size = Some(16);
        request.options.overlap_size = Some(0);
        request
    }

    fn as_progress(event: &SessionEvent) -> Option<&ProgressEvent> {
        match &event.event {
            ProcessEvent::Progress(p) => Some(p),
            _ => None,
        }
    }

    fn as_error(event: &SessionEvent) -> Option<&ErrorEvent> {
        match &event.event {
            ProcessEvent::Error(e) => Some(e),
            _ => None,
        }
    }

    fn as_complete(event: &SessionEvent) -> Option<&CompleteEvent> {
        match &event.event {
            ProcessEvent::Complete(c) => Some(c),
            _ => None,
        }
    }

    async fn run_with(
        transformer: Arc<dyn Transformer>,
        request: &ProcessRequest,
    ) -> (SessionReport, Vec<SessionEvent>) {
        let orchestrator = Orchestrator::new(transformer);
        let mut events = Vec::new();
        let report = orchestrator
            .run(request, &mut events, &CancelToken::never())
            .await
            .unwrap();
        (report, events)
    }

    #[tokio::test]
    async fn test_event_sequence_all_success() {
        let (report, events) = run_with(Arc::new(EchoTransformer::new()), &three_paragraphs()).await;

        let names: Vec<&str> = events.iter().map(|e| e.event.name()).collect();
        assert_eq!(
            names,
            vec![
                "progress",
                "progress",
                "chunk_complete",
                "progress",
                "chunk_complete",
                "progress",
                "chunk_complete",
                "complete"
            ]
        );
        assert!(report.is_completed());
        assert_eq!(report.result, "<alpha alpha> <bravo bravo> <charlie charlie>");
        assert_eq!(report.events_emitted, 8);
    }

    #[tokio::test]
    async fn test_progress_before_each_segment() {
        let (_, events) = run_with(Arc::new(EchoTransformer::new()), &three_paragraphs()).await;

        let first = as_progress(&events[0]).unwrap();
        assert_eq!(first.total_chunks, 3);
        assert_eq!(first.current_chunk, 0);
        assert_eq!(first.percentage, None);

        let second = as_progress(&events[1]).unwrap();
        assert_eq!(second.current_chunk, 1);
        assert_eq!(second.percentage, Some(33));
    }

    #[tokio::test]
    async fn test_partial_result_is_cumulative() {
        let (_, events) = run_with(Arc::new(EchoTransformer::new()), &three_paragraphs()).await;

        let partials: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.event {
                ProcessEvent::ChunkComplete(c) => Some(c.partial_result.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            partials,
            vec![
                "<alpha alpha>",
                "<alpha alpha> <bravo bravo>",
                "<alpha alpha> <bravo bravo> <charlie charlie>"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_segment_is_isolated() {
        let transformer = Arc::new(EchoTransformer::failing_on("bravo"));
        let (report, events) = run_with(transformer.clone(), &three_paragraphs()).await;

        assert_eq!(transformer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.result, "<alpha alpha> <charlie charlie>");
        assert_eq!(report.failed_segments, vec![2]);

        let errors: Vec<&ErrorEvent> = events.iter().filter_map(as_error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].chunk_index, Some(2));
        assert!(errors[0].message.starts_with("Error in segment 2:"));

        let complete = as_complete(events.last().unwrap()).unwrap();
        assert_eq!(complete.failed_chunks, vec![2]);
        assert_eq!(complete.total_chunks, 3);
    }

    #[tokio::test]
    async fn test_all_segments_fail_still_completes() {
        let transformer = Arc::new(EchoTransformer::failing_on(" "));
        let (report, events) = run_with(transformer, &three_paragraphs()).await;

        assert!(report.is_completed());
        assert!(report.result.is_empty());
        assert_eq!(report.failed_segments, vec![1, 2, 3]);
        assert_eq!(events.last().map(|e| e.event.name()), Some("complete"));
    }

    #[tokio::test]
    async fn test_validation_failure_single_error() {
        let request = ProcessRequest::new("some text", "translate");
        let transformer = Arc::new(EchoTransformer::new());
        let (report, events) = run_with(transformer.clone(), &request).await;

        assert!(matches!(report.state, SessionState::Failed { .. }));
        assert_eq!(report.total_segments, 0);
        assert_eq!(events.len(), 1);
        let err = as_error(&events[0]).unwrap();
        assert_eq!(err.chunk_index, None);
        assert_eq!(transformer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_single_empty_segment() {
        let request = ProcessRequest::new("", "transcribe");
        let (report, events) = run_with(Arc::new(EchoTransformer::new()), &request).await;

        let first = as_progress(&events[0]).unwrap();
        assert_eq!(first.total_chunks, 1);
        assert_eq!(report.result, "<>");
        assert_eq!(events.last().map(|e| e.event.name()), Some("complete"));
    }

    #[tokio::test]
    async fn test_cancel_before_start_emits_only_split_progress() {
        let (handle, token) = crate::pipeline::cancellation();
        handle.cancel();

        let orchestrator = Orchestrator::new(Arc::new(EchoTransformer::new()));
        let mut events = Vec::new();
        let report = orchestrator
            .run(&three_paragraphs(), &mut events, &token)
            .await
            .unwrap();

        assert_eq!(report.state, SessionState::Cancelled);
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_result() {
        let (handle, token) = crate::pipeline::cancellation();
        let transformer = CancellingTransformer {
            handle: Mutex::new(Some(handle)),
        };

        let orchestrator = Orchestrator::new(Arc::new(transformer));
        let mut events = Vec::new();
        let report = orchestrator
            .run(&three_paragraphs(), &mut events, &token)
            .await
            .unwrap();

        assert_eq!(report.state, SessionState::Cancelled);
        assert!(report.result.is_empty());
        // Split progress and the first segment's progress, nothing after.
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event.name() == "progress"));
    }

    #[tokio::test]
    async fn test_sink_failure_terminates_session() {
        let orchestrator = Orchestrator::new(Arc::new(EchoTransformer::new()));
        let mut sink = FlakySink { remaining: 2 };
        let result = orchestrator
            .run(&three_paragraphs(), &mut sink, &CancelToken::never())
            .await;

        assert!(matches!(
            result,
            Err(crate::Error::Channel(ChannelError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_run_text_with_dyn_sink() {
        let orchestrator = Orchestrator::new(Arc::new(EchoTransformer::new()));
        let mut events: Vec<SessionEvent> = Vec::new();
        let sink: &mut dyn EventSink = &mut events;
        let report = orchestrator
            .run_text(
                "short",
                &Operation::Transcribe,
                &ChunkBudget::default(),
                &TransformOptions::default(),
                sink,
                &CancelToken::never(),
            )
            .await
            .unwrap();

        assert_eq!(report.result, "<short>");
        assert_eq!(report.total_segments, 1);
    }

    #[tokio::test]
    async fn test_spawn_streams_events() {
        use tokio_stream::StreamExt;

        let orchestrator = Orchestrator::new(Arc::new(EchoTransformer::new()));
        let (stream, handle) = orchestrator.spawn(three_paragraphs(), CancelToken::never());

        let events: Vec<SessionEvent> = stream.collect().await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(events.len() as u64, report.events_emitted);
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (1..=8).collect::<Vec<u64>>());
    }
}
