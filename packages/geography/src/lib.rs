#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Retrieval of static census geography assets.
//!
//! Tract boundary files, postal-code gazetteers, and SVI tables are
//! external read-only resources that may live on disk or behind an HTTP
//! URL (e.g. a raw GitHub file). This package fetches them as text and
//! hands them to the loaders in `ppe_priority_spatial`,
//! `ppe_priority_geocoder`, and `ppe_priority_svi`; it does no parsing of
//! its own.

use std::path::Path;

use thiserror::Error;

/// User-Agent sent with HTTP asset downloads.
const USER_AGENT: &str = "ppe-priority/0.1";

/// Errors from asset retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns `true` if `source` should be fetched over HTTP rather than
/// read from the local filesystem.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Builds a `reqwest::Client` configured for asset downloads.
///
/// # Errors
///
/// Returns [`FetchError`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Into::into)
}

/// Fetches an asset as text from a local path or an `http(s)://` URL.
///
/// Loading boundary datasets can be slow; this is intended as a one-time
/// startup cost, not a per-query operation.
///
/// # Errors
///
/// Returns [`FetchError`] if the download or file read fails, or if an
/// HTTP response has a non-success status.
pub async fn fetch_text(client: &reqwest::Client, source: &str) -> Result<String, FetchError> {
    if is_remote(source) {
        log::info!("Downloading asset from {source}");
        let resp = client.get(source).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    } else {
        log::info!("Reading asset from {source}");
        Ok(tokio::fs::read_to_string(Path::new(source)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_sources() {
        assert!(is_remote("https://example.com/tracts.geojson"));
        assert!(is_remote("http://example.com/gazetteer.txt"));
        assert!(!is_remote("/data/tracts_usna.geojson"));
        assert!(!is_remote("relative/path.csv"));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let path = std::env::temp_dir().join("ppe_priority_fetch_test.txt");
        tokio::fs::write(&path, "hello").await.unwrap();
        let client = build_client().unwrap();
        let text = fetch_text(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(text, "hello");
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn missing_local_file_is_io_error() {
        let client = build_client().unwrap();
        let err = fetch_text(&client, "/nonexistent/ppe/tracts.geojson")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
