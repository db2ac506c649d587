//! Subcommand handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use mailbuffer_core::mailer::render::format_entry;
use mailbuffer_core::{BufferingMailer, FlushStatus, LogEntry, MailerConfig, TIMESTAMP_FORMAT};
use tracing::{info, warn};

use crate::cli::PushArgs;

/// Exit status for a flush whose delivery failed.
pub const EXIT_DELIVERY_FAILED: u8 = 2;

/// Resolves the config path: explicit, else `<config dir>/mailbuffer/config.json`.
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let Some(dir) = dirs::config_dir() else {
        bail!("No config directory on this platform; pass --config");
    };
    Ok(dir.join("mailbuffer").join("config.json"))
}

/// Loads the config file and opens the mailer it describes.
pub fn open_mailer(path: &Path) -> Result<BufferingMailer> {
    let config = MailerConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    BufferingMailer::with_smtp(config).context("Failed to open mailer")
}

/// Appends one entry and persists it.
pub fn push(mailer: &mut BufferingMailer, args: PushArgs) -> Result<()> {
    let mut entry = LogEntry::new(args.logger, args.level, args.message, args.file, args.line)
        .with_timestamp(Local::now().format(TIMESTAMP_FORMAT).to_string());
    entry.function = args.function;

    mailer.append(entry);
    mailer.save().context("Failed to save state")?;
    info!(
        pending = mailer.len(),
        bytes = mailer.total_size(),
        capacity = mailer.capacity(),
        "Entry buffered"
    );
    Ok(())
}

/// Prints pending entries, one formatted line each or as the state document.
pub fn pending(mailer: &BufferingMailer, json: bool) -> Result<()> {
    if json {
        let doc = serde_json::to_string_pretty(&mailer.state().to_stored())?;
        println!("{doc}");
        return Ok(());
    }

    for entry in mailer.entries() {
        println!("{}", format_entry(&entry));
    }
    println!(
        "{} pending, {} of {} bytes",
        mailer.len(),
        mailer.total_size(),
        mailer.capacity()
    );
    Ok(())
}

/// Flushes and returns the process exit status.
pub async fn flush(mailer: &mut BufferingMailer, force: bool, alerts: &[String]) -> Result<u8> {
    let outcome = mailer.flush(force, alerts).await?;
    println!("{outcome}");

    if outcome.status == FlushStatus::Failed {
        warn!(pending = mailer.len(), "Delivery failed; entries kept for the next flush");
        return Ok(EXIT_DELIVERY_FAILED);
    }
    Ok(0)
}
