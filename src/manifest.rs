//! Manifest parsing: one download job per line.
//!
//! Format: `<file-id> <destination>` separated by runs of whitespace. Lines
//! starting with `#` are comments; whitespace-only lines are skipped. Extra
//! tokens after the first two are ignored.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One download job: an opaque Drive file id paired with a local destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub file_id: String,
    pub destination: PathBuf,
}

/// Reads and parses a manifest file. The whole file is parsed before any
/// download starts, so a malformed line aborts the run up front.
pub fn load(path: &Path) -> Result<Vec<DownloadJob>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    parse(&text)
}

/// Parses manifest text into jobs. Errors name the offending 1-based line.
pub fn parse(text: &str) -> Result<Vec<DownloadJob>> {
    let mut jobs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let file_id = match tokens.next() {
            Some(t) => t,
            None => continue,
        };
        let destination = match tokens.next() {
            Some(t) => t,
            None => bail!(
                "manifest line {}: expected `<file-id> <destination>`, got {:?}",
                idx + 1,
                line.trim()
            ),
        };
        jobs.push(DownloadJob {
            file_id: file_id.to_string(),
            destination: PathBuf::from(destination),
        });
    }
    Ok(jobs)
}
