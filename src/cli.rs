//! CLI for the gdget downloader.
//!
//! Two invocation forms, told apart by argument count:
//! `gdget <FILE_ID> <DESTINATION>` downloads one file; `gdget <MANIFEST>`
//! downloads every entry of a manifest file. Any other argument count is a
//! clap usage error: usage text on stderr, exit status 2.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::batch;
use crate::config;

/// Top-level CLI for the gdget downloader.
#[derive(Debug, Parser)]
#[command(name = "gdget")]
#[command(about = "Download files from Google Drive, confirming the large-file interstitial", long_about = None)]
pub struct Cli {
    /// Drive file id (with DESTINATION), or path to a manifest file when given alone.
    pub file_id_or_manifest: String,

    /// Destination path for the downloaded file. Omit to treat the first
    /// argument as a manifest of `<file-id> <destination>` lines.
    pub destination: Option<PathBuf>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.destination {
            Some(destination) => batch::run_single(&cfg, &cli.file_id_or_manifest, &destination),
            None => batch::run_batch(&cfg, Path::new(&cli.file_id_or_manifest)),
        }
    }
}
