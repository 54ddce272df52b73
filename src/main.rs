//! Binary entry point for chunkstream.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use chunkstream::cli::output::{OutputFormat, format_error};
use chunkstream::cli::{Cli, execute};
use chunkstream::pipeline::cancellation;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.format);

    init_tracing(cli.verbose);

    let (handle, token) = cancellation();
    // Only a running session can stop cleanly; other commands die on SIGINT.
    if cli.command.is_cancellable() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling (press Ctrl-C again to exit)");
                handle.cancel();
            }
            // A transformer call in flight can take up to the provider timeout.
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("second interrupt received, exiting");
                std::process::exit(130);
            }
        });
    }

    match execute(&cli, &token).await {
        Ok(output) => {
            if !output.is_empty() {
                // Handle broken pipe gracefully (e.g., when piped to `head` or `jq`)
                if let Err(e) = write!(io::stdout(), "{output}")
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Error writing to stdout: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let error_output = format_error(&e, format);
            match format {
                OutputFormat::Json | OutputFormat::Ndjson => {
                    // JSON errors go to stdout for programmatic parsing
                    println!("{error_output}");
                }
                OutputFormat::Text | OutputFormat::Sse => {
                    eprintln!("Error: {error_output}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr so stdout stays a clean result stream.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "chunkstream=debug"
    } else {
        "chunkstream=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
