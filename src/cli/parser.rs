//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::{ChunkBudget, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::{Error, SegmentationError};
use crate::io::STDIN_PATH;
use crate::transform::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, Provider,
    ProviderConfig,
};

/// chunkstream: segment long texts and transform them segment by segment.
///
/// Splits a document into bounded segments at natural boundaries, sends
/// each one to a language model for transcription or translation, and
/// streams progress and partial results as events.
#[derive(Parser, Debug)]
#[command(name = "chunkstream")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson, sse).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Segmentation budget arguments.
#[derive(Args, Debug, Clone)]
pub struct BudgetArgs {
    /// Segment ceiling in characters.
    #[arg(long, env = "MAX_CHUNK_SIZE", default_value_t = DEFAULT_MAX_CHUNK_SIZE)]
    pub max_chunk_size: usize,

    /// Overlap between windowed segments in characters.
    #[arg(long, env = "OVERLAP_SIZE", default_value_t = DEFAULT_OVERLAP)]
    pub overlap: usize,
}

impl BudgetArgs {
    /// Builds the validated budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the size or overlap is out of range.
    pub fn budget(&self) -> Result<ChunkBudget, SegmentationError> {
        ChunkBudget::new(self.max_chunk_size, self.overlap)
    }
}

/// Transformer backend arguments.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Transformer backend (openai, demo).
    #[arg(long, env = "AI_PROVIDER", default_value = "openai")]
    pub provider: Provider,

    /// API key for the backend.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// Model to request.
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "AI_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl ProviderArgs {
    /// Builds the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout is zero.
    pub fn config(&self) -> Result<ProviderConfig, Error> {
        if self.timeout == 0 {
            return Err(Error::Config {
                message: "timeout must be at least one second".to_string(),
            });
        }
        Ok(ProviderConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a text into segments and print them.
    Segment {
        /// Input file (`-` for stdin).
        #[arg(default_value = STDIN_PATH)]
        input: PathBuf,

        #[command(flatten)]
        budget: BudgetArgs,

        /// Re-split segments estimated above this many tokens.
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Use a single strategy (windowed fallback still applies).
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Split a text and write each segment to its own file.
    WriteSegments {
        /// Input file (`-` for stdin).
        #[arg(default_value = STDIN_PATH)]
        input: PathBuf,

        /// Output directory.
        #[arg(short, long, default_value = "segments")]
        out_dir: PathBuf,

        /// Filename prefix.
        #[arg(long, default_value = "segment")]
        prefix: String,

        #[command(flatten)]
        budget: BudgetArgs,

        /// Re-split segments estimated above this many tokens.
        #[arg(long)]
        max_tokens: Option<usize>,
    },

    /// Transcribe or translate a text, streaming events to stdout.
    Process {
        /// Input file (`-` for stdin).
        #[arg(default_value = STDIN_PATH)]
        input: PathBuf,

        /// Operation to apply (transcribe, translate).
        #[arg(short, long, default_value = "transcribe")]
        operation: String,

        /// Target language for translation (code or name).
        #[arg(short, long)]
        target_language: Option<String>,

        #[command(flatten)]
        budget: BudgetArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Sampling temperature.
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Maximum tokens generated per segment.
        #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
        max_tokens: u32,

        /// Also write the final result to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List segmentation strategies.
    Strategies,

    /// Show service capabilities and provider status.
    Info {
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

impl Commands {
    /// Returns true if the command observes cooperative cancellation.
    ///
    /// Other commands keep the default interrupt behavior.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Process { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_segment_defaults() {
        let cli = Cli::try_parse_from(["chunkstream", "segment", "doc.txt"]).unwrap();
        assert!(matches!(cli.command, Commands::Segment { .. }));
        if let Commands::Segment {
            input,
            budget,
            max_tokens,
            strategy,
        } = cli.command
        {
            assert_eq!(input, PathBuf::from("doc.txt"));
            assert_eq!(budget.budget().unwrap(), ChunkBudget::default());
            assert!(max_tokens.is_none());
            assert!(strategy.is_none());
        }
    }

    #[test]
    fn test_process_arguments() {
        let cli = Cli::try_parse_from([
            "chunkstream",
            "--format",
            "sse",
            "process",
            "-",
            "--operation",
            "translate",
            "--target-language",
            "fr",
            "--provider",
            "demo",
            "--max-chunk-size",
            "500",
        ])
        .unwrap();
        assert_eq!(cli.format, "sse");
        assert!(matches!(cli.command, Commands::Process { .. }));
        if let Commands::Process {
            operation,
            target_language,
            budget,
            provider,
            ..
        } = cli.command
        {
            assert_eq!(operation, "translate");
            assert_eq!(target_language.as_deref(), Some("fr"));
            assert_eq!(budget.max_chunk_size, 500);
            assert_eq!(provider.config().unwrap().provider, Provider::Demo);
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Cli::try_parse_from(["chunkstream", "info", "--provider", "carrier-pigeon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli =
            Cli::try_parse_from(["chunkstream", "info", "--provider", "demo", "--timeout", "0"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Info { .. }));
        if let Commands::Info { provider } = cli.command {
            assert!(matches!(provider.config(), Err(Error::Config { .. })));
        }
    }

    #[test]
    fn test_only_process_is_cancellable() {
        let process = Cli::try_parse_from(["chunkstream", "process", "-"]).unwrap();
        assert!(process.command.is_cancellable());

        let segment = Cli::try_parse_from(["chunkstream", "segment", "-"]).unwrap();
        assert!(!segment.command.is_cancellable());

        let write = Cli::try_parse_from(["chunkstream", "write-segments", "-"]).unwrap();
        assert!(!write.command.is_cancellable());
        assert!(!Commands::Strategies.is_cancellable());
    }

    #[test]
    fn test_invalid_budget() {
        let args = BudgetArgs {
            max_chunk_size: 10,
            overlap: 10,
        };
        assert!(args.budget().is_err());
    }
}
