//! Output formatting for CLI commands.
//!
//! Supports text, JSON, NDJSON, and Server-Sent Events output.

use std::fmt::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::core::Segment;
use crate::error::{ChannelError, Error};
use crate::io::unicode::truncate_chars;
use crate::pipeline::{EventSink, ProcessEvent, SessionEvent, SessionReport};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON.
    Ndjson,
    /// Server-Sent Events frames.
    Sse,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            "sse" => Self::Sse,
            _ => Self::Text,
        }
    }

    /// Returns true if session events are written as they happen.
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::Ndjson | Self::Sse)
    }
}

/// Formats a segment list.
#[must_use]
pub fn format_segments(segments: &[Segment], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_segments_text(segments),
        OutputFormat::Json | OutputFormat::Sse => format_json(&segments),
        OutputFormat::Ndjson => format_ndjson(segments),
    }
}

fn format_segments_text(segments: &[Segment]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} segments:", segments.len());
    let _ = writeln!(
        output,
        "{:<6} {:<12} {:<10} {:<10} Preview",
        "Index", "Strategy", "Chars", "~Tokens"
    );
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for segment in segments {
        let preview = truncate(&segment.content.replace('\n', "\\n"), 30);
        let _ = writeln!(
            output,
            "{:<6} {:<12} {:<10} {:<10} {}",
            segment.index,
            segment.strategy,
            segment.char_count(),
            segment.estimate_tokens(),
            preview
        );
    }

    output
}

/// Formats the paths written by `write-segments`.
#[must_use]
pub fn format_write_segments_result(paths: &[PathBuf], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Wrote {} segments:", paths.len());
            for path in paths {
                let _ = writeln!(output, "  {}", path.display());
            }
            output
        }
        OutputFormat::Json | OutputFormat::Sse => format_json(&paths),
        OutputFormat::Ndjson => format_ndjson(paths),
    }
}

/// A segmentation strategy listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    /// Strategy name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Formats the strategy list.
#[must_use]
pub fn format_strategies(strategies: &[StrategyInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Strategies (in priority order):\n");
            for (i, strategy) in strategies.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "  {}. {:<12} {}",
                    i + 1,
                    strategy.name,
                    strategy.description
                );
            }
            output
        }
        OutputFormat::Json | OutputFormat::Sse => format_json(&strategies),
        OutputFormat::Ndjson => format_ndjson(strategies),
    }
}

/// Service capabilities, as reported by `info`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Crate version.
    pub version: &'static str,
    /// Supported operation names.
    pub operations: Vec<&'static str>,
    /// Supported target languages as (code, name) pairs.
    pub languages: Vec<(&'static str, &'static str)>,
    /// Selected provider.
    pub provider: String,
    /// Whether the provider can make real requests.
    pub configured: bool,
    /// Default model.
    pub default_model: String,
    /// Default segment ceiling in characters.
    pub max_chunk_size: usize,
    /// Default overlap in characters.
    pub overlap_size: usize,
}

/// Formats service info.
#[must_use]
pub fn format_info(info: &ServiceInfo, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "chunkstream {}", info.version);
            output.push_str("==================\n\n");
            let _ = writeln!(output, "  Operations:     {}", info.operations.join(", "));
            let _ = writeln!(
                output,
                "  Provider:       {} ({})",
                info.provider,
                if info.configured {
                    "configured"
                } else {
                    "not configured, demo output"
                }
            );
            let _ = writeln!(output, "  Model:          {}", info.default_model);
            let _ = writeln!(output, "  Max chunk size: {} chars", info.max_chunk_size);
            let _ = writeln!(output, "  Overlap:        {} chars", info.overlap_size);
            output.push_str("  Languages:\n");
            for (code, name) in &info.languages {
                let _ = writeln!(output, "    {code:<4} {name}");
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson | OutputFormat::Sse => format_json(info),
    }
}

/// Formats a session report.
///
/// Streaming formats have already written every event, so they produce no
/// further output.
#[must_use]
pub fn format_report(
    report: &SessionReport,
    events: &[SessionEvent],
    format: OutputFormat,
) -> String {
    // Streaming formats already wrote every event, including the result.
    if format.is_streaming() {
        return String::new();
    }
    match format {
        OutputFormat::Text => {
            let mut output = report.result.clone();
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ReportWithEvents<'a> {
                report: &'a SessionReport,
                events: &'a [SessionEvent],
            }
            format_json(&ReportWithEvents { report, events })
        }
        OutputFormat::Ndjson | OutputFormat::Sse => String::new(),
    }
}

/// Formats an error.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text | OutputFormat::Sse => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            serde_json::to_string(&ErrorOutput {
                error: error.to_string(),
            })
            .unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Writes session events as human-readable progress lines.
#[derive(Debug)]
pub struct TextWriter<W> {
    writer: W,
}

impl<W> TextWriter<W> {
    /// Creates a text writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Renders one event as a status line.
#[must_use]
pub fn event_line(event: &ProcessEvent) -> String {
    match event {
        ProcessEvent::Progress(p) => match p.percentage {
            Some(pct) => format!("[{pct:>3}%] {}", p.message),
            None => format!("[   ] {}", p.message),
        },
        ProcessEvent::ChunkComplete(c) => format!(
            "[ ok ] segment {} ({} chars)",
            c.chunk_index,
            c.result.chars().count()
        ),
        ProcessEvent::Error(e) => format!("[fail] {}", e.message),
        ProcessEvent::Complete(c) => format!("[done] {}", c.message),
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for TextWriter<W> {
    async fn send(&mut self, event: SessionEvent) -> Result<(), ChannelError> {
        let mut line = event_line(&event.event);
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats each item as one JSON line.
fn format_ndjson<T: Serialize>(items: &[T]) -> String {
    let mut output = String::new();
    for item in items {
        if let Ok(line) = serde_json::to_string(item) {
            output.push_str(&line);
            output.push('\n');
        }
    }
    output
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    let head = truncate_chars(s, max_chars);
    if head.len() == s.len() {
        s.to_string()
    } else if max_chars <= 3 {
        head.to_string()
    } else {
        format!("{}...", truncate_chars(s, max_chars - 3))
    }
}
