//! Fetching raw reference data from a file or an http(s) URL.

use std::path::PathBuf;
use std::time::Duration;

use super::DataError;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads `source` as text.
pub fn fetch(source: &str) -> Result<String, DataError> {
    if is_remote(source) {
        fetch_remote(source)
    } else {
        std::fs::read_to_string(source).map_err(|e| DataError::Io {
            path: PathBuf::from(source),
            source: e,
        })
    }
}

fn fetch_remote(url: &str) -> Result<String, DataError> {
    let http = |e: reqwest::Error| DataError::Http {
        url: url.to_string(),
        source: e,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(http)?;

    client
        .get(url)
        .header("User-Agent", "raidshot")
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(http)
}
