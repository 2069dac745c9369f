//! Font download over HTTP, for deployments that keep fonts off the local disk.

use crate::error::{PageTableError, Result};
use crate::font::FontSource;
use reqwest::Client;
use tracing::debug;

/// Downloads a font program and returns it as an in-memory source.
///
/// Any transport failure or non-success status is reported as
/// [`PageTableError::FontUnavailable`].
pub async fn fetch_font(url: &str) -> Result<FontSource> {
    let client = Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| PageTableError::font(url, err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PageTableError::font(url, format!("HTTP {status}")));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| PageTableError::font(url, err.to_string()))?;
    debug!(url, bytes = bytes.len(), "font downloaded");
    Ok(FontSource::bytes(font_name_from_url(url), bytes.to_vec()))
}

/// Blocking wrapper around [`fetch_font`] on a private current-thread runtime.
pub fn fetch_font_blocking(url: &str) -> Result<FontSource> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(fetch_font(url))
}

fn font_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.contains(':'))
        .unwrap_or("remote-font")
        .to_string()
}
