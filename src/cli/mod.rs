//! CLI layer for chunkstream.
//!
//! Provides the command-line interface using clap, with commands for
//! segmenting documents and running transformation sessions.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
