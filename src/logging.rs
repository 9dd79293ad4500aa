//! Logging setup: tracing to a file under the XDG state dir, or to stderr
//! when that dir cannot be used.

use anyhow::{Context, Result};
use std::fs;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise keep our own crate chatty and the rest at info.
fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gdget=debug"))
}

/// Initialize structured logging to `~/.local/state/gdget/gdget.log`.
/// Returns Err without installing a subscriber if the log file cannot be
/// opened, so the caller can fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gdget")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;

    let log_path = log_dir.join("gdget.log");
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    tracing::info!("logging to {}", log_path.display());
    Ok(())
}

/// Stderr-only fallback, so an unwritable state dir never stops a download.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
