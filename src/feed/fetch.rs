// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::FeedError;
use crate::http::HttpClient;

use super::parse::{Feed, parse_feed};

/// Fetch raw feed bytes from a URL (without parsing)
pub async fn fetch_feed_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes, FeedError> {
    let bytes = client
        .get_bytes(url)
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;
    debug!(url, bytes = bytes.len(), "fetched feed");
    Ok(bytes)
}

/// Read raw feed bytes from a local file (without parsing)
pub fn read_feed_file(path: &Path) -> Result<Vec<u8>, FeedError> {
    std::fs::read(path).map_err(|e| FeedError::FileReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Fetch and parse a podcast feed from a URL
pub async fn fetch_feed<C: HttpClient>(client: &C, url: &str) -> Result<Feed, FeedError> {
    let bytes = fetch_feed_bytes(client, url).await?;
    parse_feed(&bytes)
}

/// Parse a podcast feed from a local file
pub fn parse_feed_file(path: &Path) -> Result<Feed, FeedError> {
    let bytes = read_feed_file(path)?;
    parse_feed(&bytes)
}

/// Load a feed from either an http(s) URL or a local file path
pub async fn load_feed<C: HttpClient>(client: &C, source: &str) -> Result<Feed, FeedError> {
    if is_url(source) {
        fetch_feed(client, source).await
    } else {
        parse_feed_file(Path::new(source))
    }
}

/// Determine if a string is a URL or a file path
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
