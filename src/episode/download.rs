use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::error::DownloadError;
use crate::feed::Episode;
use crate::http::HttpClient;
use crate::library::partial_path;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Download an episode's audio to the specified output path
///
/// Streams the response body into a `.partial` file next to `output_path`
/// and renames it into place once complete, so an interrupted download never
/// looks like a finished episode. Returns the number of bytes downloaded.
pub async fn download_audio<C: HttpClient>(
    client: &C,
    episode: &Episode,
    output_path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let partial = partial_path(output_path);

    let result = stream_to_file(client, episode, &partial, reporter).await;
    let bytes_downloaded = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, output_path)
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    reporter.report(ProgressEvent::DownloadCompleted {
        episode_title: episode.title.clone(),
        bytes_downloaded,
    });

    Ok(bytes_downloaded)
}

async fn stream_to_file<C: HttpClient>(
    client: &C,
    episode: &Episode,
    path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let url = episode.enclosure_url.as_str();

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if response.status >= 400 {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    reporter.report(ProgressEvent::DownloadStarting {
        episode_title: episode.title.clone(),
        content_length: response.content_length,
    });

    let mut file = File::create(path)
        .await
        .map_err(|e| DownloadError::FileCreateFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut bytes_downloaded: u64 = 0;
    let mut stream = response.body;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::FileWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;

        reporter.report(ProgressEvent::DownloadProgress {
            episode_title: episode.title.clone(),
            bytes_downloaded,
            total_bytes: response.content_length,
        });
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_downloaded)
}

/// Fetch cover art for an episode
///
/// Cover art is cosmetic: any failure is logged and yields `None`.
pub async fn fetch_image<C: HttpClient>(client: &C, url: &Url) -> Option<Vec<u8>> {
    match client.get_bytes(url.as_str()).await {
        Ok(bytes) if !bytes.is_empty() => {
            debug!(url = %url, bytes = bytes.len(), "fetched cover art");
            Some(bytes.to_vec())
        }
        Ok(_) => {
            warn!(url = %url, "cover art response was empty, continuing without it");
            None
        }
        Err(e) => {
            warn!(url = %url, error = %e, "failed to fetch cover art, continuing without it");
            None
        }
    }
}
