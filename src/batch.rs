//! Sequential download execution: one job, or a manifest of jobs in file order.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::GdgetConfig;
use crate::fetcher;
use crate::manifest;

/// Downloads a single file. Prints a status line before starting, the way the
/// batch loop does for each entry.
pub fn run_single(cfg: &GdgetConfig, file_id: &str, destination: &Path) -> Result<()> {
    println!(
        "Downloading file {} saving as {}",
        file_id,
        destination.display()
    );
    fetcher::fetch(cfg, file_id, destination)
        .with_context(|| format!("download of {} failed", file_id))?;
    println!();
    Ok(())
}

/// Downloads every entry of a manifest, strictly in file order, one at a time.
/// The first failing entry aborts the rest; there is no per-entry recovery.
pub fn run_batch(cfg: &GdgetConfig, manifest_path: &Path) -> Result<()> {
    println!("Loading list from file");
    let jobs = manifest::load(manifest_path)?;
    tracing::info!(
        manifest = %manifest_path.display(),
        entries = jobs.len(),
        "manifest loaded"
    );
    for job in &jobs {
        run_single(cfg, &job.file_id, &job.destination)?;
    }
    Ok(())
}
