//! `mailbuffer` - buffer application errors and mail them as batched alerts.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mailbuffer=debug"
    } else {
        "mailbuffer=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let path = commands::config_path(cli.config)?;
    debug!(config = %path.display(), "Loading configuration");
    let mut mailer = commands::open_mailer(&path)?;

    match cli.command {
        Command::Push(args) => commands::push(&mut mailer, args).map(|()| 0),
        Command::Pending { json } => commands::pending(&mailer, json).map(|()| 0),
        Command::Flush { force, alerts } => commands::flush(&mut mailer, force, &alerts).await,
    }
}
