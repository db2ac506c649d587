//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mailbuffer_core::Level;

/// Buffer application errors and mail them as one alert.
#[derive(Debug, Parser)]
#[command(name = "mailbuffer", version, about)]
pub struct Cli {
    /// Config file (defaults to `<config dir>/mailbuffer/config.json`)
    #[arg(short, long, global = true, env = "MAILBUFFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an entry to the pending buffer
    Push(PushArgs),
    /// List pending entries
    Pending {
        /// Print the state document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send pending entries if at capacity, or always with --force
    Flush {
        /// Send even when below capacity
        #[arg(short, long)]
        force: bool,

        /// Extra line placed above the entries (repeatable)
        #[arg(short, long = "alert", value_name = "TEXT")]
        alerts: Vec<String>,
    },
}

/// Arguments for `push`.
#[derive(Debug, Args)]
pub struct PushArgs {
    /// Message text
    pub message: String,

    /// Severity (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(short, long, default_value = "ERROR")]
    pub level: Level,

    /// Logger name
    #[arg(long, default_value = "mailbuffer-cli")]
    pub logger: String,

    /// Source file the entry refers to
    #[arg(long, default_value = "")]
    pub file: String,

    /// Line in the source file
    #[arg(long, default_value_t = 0)]
    pub line: u32,

    /// Function at the call site
    #[arg(long)]
    pub function: Option<String>,
}
