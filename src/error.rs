// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors in the run configuration, raised before any network activity
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Output path {0} is a file, please provide a directory")]
    OutputIsFile(PathBuf),

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Podcast list file not found: {0}")]
    ListFileNotFound(PathBuf),

    #[error("Failed to read podcast list {path}: {source}")]
    ListReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid podcast list entry on line {line_number}: expected 'name:url'")]
    InvalidListLine { line_number: usize },
}

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Feed or episode has no title")]
    MissingTitle,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Episode '{title}' has no enclosure (audio file)")]
    MissingEnclosure { title: String },
}

impl FeedError {
    /// Whether this error came from the network rather than the feed content
    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::FetchFailed { .. })
    }
}

/// Errors that can occur during episode downloads
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while writing tags into a downloaded file
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Failed to read existing tag from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },

    #[error("Failed to write tag to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },

    #[error("Cannot tag {path}: ID3 tags are only written to MP3 and WAV files")]
    UnsupportedFormat { path: PathBuf },
}

/// Top-level errors that abort a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Feed error for podcast '{podcast}': {source}")]
    Feed {
        podcast: String,
        #[source]
        source: FeedError,
    },

    #[error("Download error for podcast '{podcast}': {source}")]
    Download {
        podcast: String,
        #[source]
        source: DownloadError,
    },
}
