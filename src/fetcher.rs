//! Streaming download of one Drive file, handling the confirmation interstitial.
//!
//! The service answers requests for large files with a warning page instead of
//! the file, plus a cookie named `download_warning_*` whose value is a
//! confirmation token. Resending the request with `confirm=<token>` yields the
//! real bytes. Small files skip the interstitial and arrive on the first GET.

use anyhow::{bail, Context, Result};
use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str;
use thiserror::Error;

use crate::config::GdgetConfig;
use crate::endpoint;
use crate::progress::DotProgress;

/// Cookie name prefix that signals the confirmation interstitial.
const CONFIRM_COOKIE_PREFIX: &str = "download_warning";

/// Error from a single GET: curl failure, HTTP error, or storage failure.
/// Typed so callers can tell transport from disk problems before converting to anyhow.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (connection, TLS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status. The original script saved error
    /// pages as if they were the file; treating this as a failure closes that gap.
    #[error("HTTP {0}")]
    Http(u32),
    /// Disk write failed (e.g. disk full, permission denied).
    #[error("storage: {0}")]
    Storage(io::Error),
}

enum GetOutcome {
    /// Body streamed to the destination; total bytes written.
    Saved(u64),
    /// Interstitial detected; carries the `download_warning*` cookie value.
    ConfirmRequired(String),
}

/// Downloads `file_id` to `destination`, following the two-request
/// confirmation dance when the service answers with a warning cookie.
/// Returns the number of body bytes written.
pub fn fetch(cfg: &GdgetConfig, file_id: &str, destination: &Path) -> Result<u64> {
    let mut progress = DotProgress::stdout(cfg.progress_stride);

    let url = endpoint::download_url(&cfg.endpoint, file_id, None)?;
    let outcome = perform_get(url.as_str(), destination, true, cfg.buffer_bytes, &mut progress)
        .with_context(|| format!("GET {} failed", url))?;

    let written = match outcome {
        GetOutcome::Saved(n) => n,
        GetOutcome::ConfirmRequired(token) => {
            println!("Confirmation token received...");
            tracing::debug!(file_id, "confirmation token received, reissuing request");
            let url = endpoint::download_url(&cfg.endpoint, file_id, Some(&token))?;
            let outcome =
                perform_get(url.as_str(), destination, false, cfg.buffer_bytes, &mut progress)
                    .with_context(|| format!("confirmed GET {} failed", url))?;
            match outcome {
                GetOutcome::Saved(n) => n,
                GetOutcome::ConfirmRequired(_) => {
                    bail!("service demanded confirmation twice for {}", file_id)
                }
            }
        }
    };

    progress.finish();
    tracing::info!(file_id, bytes = written, dest = %destination.display(), "download complete");
    Ok(written)
}

/// One streaming GET, writing body chunks sequentially as curl hands them over.
///
/// The destination is only opened (with truncation) once the response has
/// proven to be the file: a 2xx status and no warning cookie. Interstitial
/// pages and error bodies are aborted with the write callback instead, so a
/// failed download never clobbers whatever already sits at `destination`.
///
/// With `detect_token` set, response headers are scanned as they arrive; if a
/// warning cookie shows up, `ConfirmRequired` is returned instead of a body.
///
/// No transfer timeout is configured; a hung upstream blocks indefinitely.
fn perform_get<W: Write>(
    url: &str,
    destination: &Path,
    detect_token: bool,
    buffer_bytes: usize,
    progress: &mut DotProgress<W>,
) -> Result<GetOutcome, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.buffer_size(buffer_bytes)?;

    let token: RefCell<Option<String>> = RefCell::new(None);
    let io_err: RefCell<Option<io::Error>> = RefCell::new(None);
    // Status of the latest response; redirects overwrite it, so after the
    // transfer this holds the status of the body-bearing response.
    let status = Cell::new(0u32);
    let mut file: Option<File> = None;
    let mut written: u64 = 0;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                if let Some(code) = status_from_header(line) {
                    status.set(code);
                } else if detect_token {
                    if let Some(value) = confirm_token_from_header(line) {
                        *token.borrow_mut() = Some(value);
                    }
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            // Interstitial pages and error bodies are not the file.
            if token.borrow().is_some() || !(200..300).contains(&status.get()) {
                return Ok(0); // abort transfer
            }
            if data.is_empty() {
                return Ok(0);
            }
            if file.is_none() {
                match open_destination(destination) {
                    Ok(f) => file = Some(f),
                    Err(e) => {
                        tracing::warn!("opening destination failed: {}", e);
                        *io_err.borrow_mut() = Some(e);
                        return Ok(0); // abort transfer
                    }
                }
            }
            let write_result = match file.as_mut() {
                Some(f) => f.write_all(data),
                None => Ok(()),
            };
            match write_result {
                Ok(()) => {
                    written += data.len() as u64;
                    progress.chunk();
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("write to destination failed: {}", e);
                    *io_err.borrow_mut() = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        if let Err(e) = transfer.perform() {
            if token.borrow().is_some() || !(200..300).contains(&status.get()) {
                // aborted on purpose; resolved below
            } else if let Some(io_e) = io_err.borrow_mut().take() {
                return Err(FetchError::Storage(io_e));
            } else {
                return Err(FetchError::Curl(e));
            }
        }
    }

    if let Some(token) = token.into_inner() {
        return Ok(GetOutcome::ConfirmRequired(token));
    }

    let code = status.get();
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    // Empty body: the write callback never fired, but the destination must
    // still end up as an (empty) truncated file.
    if file.is_none() {
        open_destination(destination).map_err(FetchError::Storage)?;
    }

    Ok(GetOutcome::Saved(written))
}

fn open_destination(destination: &Path) -> io::Result<File> {
    File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(destination)
}

/// Parses the status code out of a response status line ("HTTP/1.1 200 OK").
fn status_from_header(line: &str) -> Option<u32> {
    let rest = line.strip_prefix("HTTP/")?;
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// Extracts the confirmation token from one raw header line, if it is a
/// `Set-Cookie` for a cookie whose name starts with the warning prefix.
fn confirm_token_from_header(line: &str) -> Option<String> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("set-cookie") {
        return None;
    }
    // "name=value; Path=/; Expires=..." -- the first attribute is the cookie itself
    let cookie = value.split(';').next()?.trim();
    let (cookie_name, cookie_value) = cookie.split_once('=')?;
    if cookie_name.trim().starts_with(CONFIRM_COOKIE_PREFIX) {
        Some(cookie_value.trim().to_string())
    } else {
        None
    }
}
