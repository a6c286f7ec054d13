//! Loads an export from a local path or an HTTP(S) URL.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// Timeout for downloading a remote export.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads `url` with `client`, failing on non-success status codes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Fetched remote export");
    Ok(bytes)
}

/// Reads `source` from disk, or downloads it when it is an `http(s)://` URL.
#[tracing::instrument]
pub async fn load_source(source: &str) -> Result<Bytes> {
    if is_remote(source) {
        let client = BasicClient::new(FETCH_TIMEOUT)?;
        fetch_bytes(&client, source)
            .await
            .with_context(|| format!("failed to download '{source}'"))
    } else {
        let bytes = tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read '{source}'"))?;
        Ok(Bytes::from(bytes))
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
