//! Event sinks.
//!
//! A sink is where a session delivers its events. Delivery failure is a
//! [`ChannelError`] and ends the session.

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::event::SessionEvent;
use crate::error::ChannelError;

/// Default buffer size of channel sinks.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Destination for session events.
#[async_trait]
pub trait EventSink: Send {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] if the event cannot be delivered.
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError>;
}

/// Collects events in memory.
#[async_trait]
impl EventSink for Vec<SessionEvent> {
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError> {
        self.push(event);
        Ok(())
    }
}

/// Sends events over a bounded `mpsc` channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl ChannelSink {
    /// Wraps an existing sender.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError> {
        self.tx.send(event).await.map_err(|_| ChannelError::Closed)
    }
}

/// Creates a channel sink and the matching event stream.
///
/// Dropping the stream makes further sends fail with [`ChannelError::Closed`].
#[must_use]
pub fn event_channel(capacity: usize) -> (ChannelSink, ReceiverStream<SessionEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChannelSink::new(tx), ReceiverStream::new(rx))
}

/// Delivers every event of a stream to a sink, in order.
///
/// Returns the number of events forwarded once the stream ends.
///
/// # Errors
///
/// Returns the first [`ChannelError`] reported by the sink.
pub async fn forward<St, K>(mut stream: St, sink: &mut K) -> Result<u64, ChannelError>
where
    St: Stream<Item = SessionEvent> + Unpin + Send,
    K: EventSink + ?Sized,
{
    let mut count = 0;
    while let Some(event) = stream.next().await {
        sink.send(event).await?;
        count += 1;
    }
    Ok(count)
}

/// Formats an event as a Server-Sent Events frame.
///
/// # Errors
///
/// Returns [`ChannelError::Serialization`] if the payload cannot be encoded.
///
/// # Examples
///
/// ```
/// use chunkstream::pipeline::{ErrorEvent, ProcessEvent, SessionEvent, sse_frame};
///
/// let event = SessionEvent {
///     sequence: 1,
///     event: ProcessEvent::Error(ErrorEvent { message: "bad".into(), chunk_index: None }),
/// };
/// assert_eq!(
///     sse_frame(&event).unwrap(),
///     "id: 1\nevent: error\ndata: {\"message\":\"bad\"}\n\n"
/// );
/// ```
pub fn sse_frame(event: &SessionEvent) -> Result<String, ChannelError> {
    Ok(format!(
        "id: {}\nevent: {}\ndata: {}\n\n",
        event.sequence,
        event.event.name(),
        event.event.payload_json()?
    ))
}

/// Writes events as Server-Sent Events frames.
#[derive(Debug)]
pub struct SseWriter<W> {
    writer: W,
}

impl<W> SseWriter<W> {
    /// Creates an SSE writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for SseWriter<W> {
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError> {
        let frame = sse_frame(&event)?;
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Writes events as newline-delimited JSON.
#[derive(Debug)]
pub struct NdjsonWriter<W> {
    writer: W,
}

impl<W> NdjsonWriter<W> {
    /// Creates an NDJSON writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for NdjsonWriter<W> {
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError> {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::event::{ProcessEvent, ProgressEvent};

    fn progress(sequence: u64) -> SessionEvent {
        SessionEvent {
            sequence,
            event: ProcessEvent::Progress(ProgressEvent {
                message: "Processing segment 1 of 2".to_string(),
                total_chunks: 2,
                current_chunk: 1,
                percentage: Some(50),
            }),
        }
    }

    #[tokio::test]
    async fn test_vec_sink_collects() {
        let mut sink: Vec<SessionEvent> = Vec::new();
        sink.send(progress(1)).await.unwrap();
        sink.send(progress(2)).await.unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_streams() {
        let (mut sink, mut stream) = event_channel(4);
        sink.send(progress(1)).await.unwrap();
        drop(sink);

        assert_eq!(stream.next().await.map(|e| e.sequence), Some(1));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_sink_closed() {
        let (mut sink, stream) = event_channel(4);
        drop(stream);
        assert_eq!(sink.send(progress(1)).await, Err(ChannelError::Closed));
    }

    #[tokio::test]
    async fn test_forward_drains_stream() {
        let (mut sink, stream) = event_channel(4);
        sink.send(progress(1)).await.unwrap();
        sink.send(progress(2)).await.unwrap();
        drop(sink);

        let mut writer = NdjsonWriter::new(Vec::new());
        assert_eq!(forward(stream, &mut writer).await.unwrap(), 2);
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_forward_stops_on_sink_error() {
        let (mut sink, stream) = event_channel(4);
        sink.send(progress(1)).await.unwrap();
        drop(sink);

        let (mut closed, receiver) = event_channel(1);
        drop(receiver);
        assert_eq!(forward(stream, &mut closed).await, Err(ChannelError::Closed));
    }

    #[tokio::test]
    async fn test_sse_writer_frames() {
        let mut writer = SseWriter::new(Vec::new());
        writer.send(progress(3)).await.unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();

        assert!(out.starts_with("id: 3\nevent: progress\ndata: {"));
        assert!(out.contains("\"percentage\":50"));
        assert!(out.ends_with("}\n\n"));
    }

    #[tokio::test]
    async fn test_ndjson_writer_lines() {
        let mut writer = NdjsonWriter::new(Vec::new());
        writer.send(progress(1)).await.unwrap();
        writer.send(progress(2)).await.unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["sequence"], 2);
        assert_eq!(value["type"], "progress");
    }
}
