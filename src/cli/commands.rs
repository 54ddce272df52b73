//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::path::Path;

use tracing::{debug, info};

use crate::chunking::{Segmenter, available_strategies, create_strategy};
use crate::cli::output::{
    OutputFormat, ServiceInfo, StrategyInfo, TextWriter, format_info, format_report,
    format_segments, format_strategies, format_write_segments_result,
};
use crate::cli::parser::{BudgetArgs, Cli, Commands, ProviderArgs};
use crate::core::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP, Segment};
use crate::error::{CommandError, Result};
use crate::io::{read_input, write_file, write_segments};
use crate::pipeline::{
    CancelToken, EventSink, NdjsonWriter, Orchestrator, ProcessRequest, RequestOptions,
    SessionEvent, SessionReport, SessionState, SseWriter, forward,
};
use crate::transform::prompt::SUPPORTED_LANGUAGES;
use crate::transform::{ProviderConfig, create_transformer};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
/// * `cancel` - Cancellation token observed by `process`.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli, cancel: &CancelToken) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Segment {
            input,
            budget,
            max_tokens,
            strategy,
        } => cmd_segment(input, budget, *max_tokens, strategy.as_deref(), format),
        Commands::WriteSegments {
            input,
            out_dir,
            prefix,
            budget,
            max_tokens,
        } => cmd_write_segments(input, out_dir, prefix, budget, *max_tokens, format),
        Commands::Process {
            input,
            operation,
            target_language,
            budget,
            provider,
            temperature,
            max_tokens,
            output,
        } => {
            let request = ProcessRequest {
                text: read_input(input)?,
                operation: operation.clone(),
                target_language: target_language.clone(),
                options: RequestOptions {
                    max_chunk_size: Some(budget.max_chunk_size),
                    overlap_size: Some(budget.overlap),
                    max_tokens: Some(*max_tokens),
                    temperature: Some(*temperature),
                    model: Some(provider.model.clone()),
                },
            };
            cmd_process(
                &request,
                &provider.config()?,
                output.as_deref(),
                format,
                cancel,
            )
            .await
        }
        Commands::Strategies => Ok(cmd_strategies(format)),
        Commands::Info { provider } => cmd_info(provider, format),
    }
}

/// Reads and segments an input, applying the optional token limit.
fn segment_input(
    input: &Path,
    budget: &BudgetArgs,
    max_tokens: Option<usize>,
    strategy: Option<&str>,
) -> Result<Vec<Segment>> {
    let budget = budget.budget()?;
    let text = read_input(input)?;

    let segmenter = match strategy {
        Some(name) => Segmenter::with_strategies(vec![create_strategy(name)?]),
        None => Segmenter::new(),
    };

    let segments = segmenter.segment(&text, &budget);
    debug!(
        segments = segments.len(),
        chars = text.chars().count(),
        "input segmented"
    );

    match max_tokens {
        Some(limit) => Ok(segmenter.enforce_token_limit(segments, limit)?),
        None => Ok(segments),
    }
}

fn cmd_segment(
    input: &Path,
    budget: &BudgetArgs,
    max_tokens: Option<usize>,
    strategy: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let segments = segment_input(input, budget, max_tokens, strategy)?;
    Ok(format_segments(&segments, format))
}

fn cmd_write_segments(
    input: &Path,
    out_dir: &Path,
    prefix: &str,
    budget: &BudgetArgs,
    max_tokens: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    if prefix.trim().is_empty() {
        return Err(CommandError::InvalidArgument("prefix must not be empty".to_string()).into());
    }

    let segments = segment_input(input, budget, max_tokens, None)?;
    let paths = write_segments(out_dir, &segments, prefix)?;
    info!(count = paths.len(), dir = %out_dir.display(), "segments written");

    Ok(format_write_segments_result(&paths, format))
}

async fn cmd_process(
    request: &ProcessRequest,
    provider: &ProviderConfig,
    output: Option<&Path>,
    format: OutputFormat,
    cancel: &CancelToken,
) -> Result<String> {
    let orchestrator = Orchestrator::new(create_transformer(provider));
    debug!(
        transformer = orchestrator.transformer_name(),
        provider = %provider.provider,
        "transformer selected"
    );

    // Streaming formats own stdout; text progress goes to stderr so stdout
    // carries only the result.
    let mut events: Vec<SessionEvent> = Vec::new();
    let report = match format {
        OutputFormat::Sse => {
            let mut sink = SseWriter::new(tokio::io::stdout());
            stream_session(&orchestrator, request, cancel, &mut sink).await?
        }
        OutputFormat::Ndjson => {
            let mut sink = NdjsonWriter::new(tokio::io::stdout());
            stream_session(&orchestrator, request, cancel, &mut sink).await?
        }
        OutputFormat::Text => {
            let mut sink = TextWriter::new(tokio::io::stderr());
            stream_session(&orchestrator, request, cancel, &mut sink).await?
        }
        OutputFormat::Json => stream_session(&orchestrator, request, cancel, &mut events).await?,
    };

    match &report.state {
        SessionState::Failed { reason } => {
            return Err(CommandError::ExecutionFailed(reason.clone()).into());
        }
        SessionState::Cancelled => {
            return Err(CommandError::ExecutionFailed("cancelled".to_string()).into());
        }
        _ => {}
    }

    if let Some(path) = output {
        write_file(path, &report.result)?;
        info!(path = %path.display(), "result written");
    }

    Ok(format_report(&report, &events, format))
}

/// Runs a session on a background task and forwards its events to `sink`.
async fn stream_session<K>(
    orchestrator: &Orchestrator,
    request: &ProcessRequest,
    cancel: &CancelToken,
    sink: &mut K,
) -> Result<SessionReport>
where
    K: EventSink + ?Sized,
{
    let (stream, handle) = orchestrator.spawn(request.clone(), cancel.clone());
    let forwarded = forward(stream, sink).await?;
    debug!(events = forwarded, "event stream drained");

    handle
        .await
        .map_err(|e| CommandError::ExecutionFailed(format!("session task failed: {e}")))?
}

fn cmd_strategies(format: OutputFormat) -> String {
    let strategies: Vec<StrategyInfo> = available_strategies()
        .into_iter()
        .filter_map(|name| create_strategy(name).ok())
        .map(|strategy| StrategyInfo {
            name: strategy.name(),
            description: strategy.description(),
        })
        .collect();
    format_strategies(&strategies, format)
}

fn cmd_info(provider: &ProviderArgs, format: OutputFormat) -> Result<String> {
    let config = provider.config()?;
    let info = ServiceInfo {
        version: env!("CARGO_PKG_VERSION"),
        operations: vec!["transcribe", "translate"],
        languages: SUPPORTED_LANGUAGES.to_vec(),
        provider: config.provider.to_string(),
        configured: config.is_configured(),
        default_model: provider.model.clone(),
        max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        overlap_size: DEFAULT_OVERLAP,
    };
    Ok(format_info(&info, format))
}
