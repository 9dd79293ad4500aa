//! Request URL construction for the download endpoint.
//!
//! The endpoint may already carry query parameters (the default one carries
//! `export=download`); `id` and `confirm` are appended, never replacing them.

use anyhow::{Context, Result};
use url::Url;

/// Builds the download URL for `file_id`, optionally carrying a confirmation
/// token from the interstitial warning page.
pub fn download_url(endpoint: &str, file_id: &str, confirm: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .with_context(|| format!("invalid endpoint URL: {}", endpoint))?;
    url.query_pairs_mut().append_pair("id", file_id);
    if let Some(token) = confirm {
        url.query_pairs_mut().append_pair("confirm", token);
    }
    Ok(url)
}
