// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::episode::{audio_extension, download_audio, fetch_image};
use crate::error::{DownloadError, FeedError, SyncError, TagError};
use crate::feed::{Feed, extract_episode, load_feed};
use crate::http::HttpClient;
use crate::library;
use crate::podlist::Podcast;
use crate::progress::{EpisodeOutcome, ProgressEvent, SharedProgressReporter};
use crate::summary::RunSummary;
use crate::tagger::tag_episode;

/// Title reported for items that could not be extracted and have no title
const UNTITLED: &str = "Untitled Episode";

/// Options for podcast synchronization
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Download and tag episodes even when their file already exists
    pub overwrite: bool,
    /// Record network and download failures and keep going instead of aborting
    pub continue_on_error: bool,
}

/// Why a single feed item could not be completed
#[derive(Error, Debug)]
enum EpisodeFailure {
    #[error(transparent)]
    Extract(#[from] FeedError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Tag(#[from] TagError),
}

#[derive(Debug, Default)]
struct SyncCounts {
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

/// Synchronize podcast feeds into `<output_root>/<podcast>/<episode>.<ext>`
///
/// This is the main entry point for the library. It:
/// 1. Loads every feed so the total number of items is known up front
/// 2. Walks each feed in order, skipping episodes already on disk
/// 3. Downloads, then tags, every new episode
/// 4. Reports exactly one `EpisodeProcessed` event per feed item
///
/// Network failures abort the run unless `continue_on_error` is set.
/// Malformed feeds, broken items and tagging failures are recorded in the
/// returned summary and the run moves on.
pub async fn sync_podcasts<C: HttpClient>(
    client: &C,
    podcasts: &[Podcast],
    output_root: &Path,
    options: &SyncOptions,
    reporter: SharedProgressReporter,
) -> Result<RunSummary, SyncError> {
    let mut summary = RunSummary::new();

    let mut feeds = Vec::with_capacity(podcasts.len());
    for podcast in podcasts {
        reporter.report(ProgressEvent::FetchingFeed {
            podcast: podcast.name.clone(),
            url: podcast.feed_url.clone(),
        });

        match load_feed(client, &podcast.feed_url).await {
            Ok(feed) => feeds.push(feed),
            Err(e) if e.is_network() && !options.continue_on_error => {
                return Err(SyncError::Feed {
                    podcast: podcast.name.clone(),
                    source: e,
                });
            }
            Err(e) => {
                warn!(podcast = %podcast.name, error = %e, "skipping feed");
                summary.record_failure(&podcast.name, None, &e);
            }
        }
    }

    let total_episodes = feeds.iter().map(|feed| feed.items.len()).sum();
    reporter.report(ProgressEvent::SyncPlanReady {
        podcast_count: feeds.len(),
        total_episodes,
    });

    let mut counts = SyncCounts::default();
    for feed in &feeds {
        sync_feed(
            client,
            feed,
            output_root,
            options,
            &reporter,
            &mut summary,
            &mut counts,
        )
        .await?;
    }

    info!(
        downloaded = counts.downloaded,
        skipped = counts.skipped,
        failed = counts.failed,
        "sync finished"
    );
    reporter.report(ProgressEvent::SyncCompleted {
        downloaded_count: counts.downloaded,
        skipped_count: counts.skipped,
        failed_count: counts.failed,
    });

    Ok(summary)
}

async fn sync_feed<C: HttpClient>(
    client: &C,
    feed: &Feed,
    output_root: &Path,
    options: &SyncOptions,
    reporter: &SharedProgressReporter,
    summary: &mut RunSummary,
    counts: &mut SyncCounts,
) -> Result<(), SyncError> {
    let podcast_title = feed.title.as_str();

    reporter.report(ProgressEvent::PodcastStarting {
        podcast_title: podcast_title.to_string(),
        episode_count: feed.items.len(),
    });

    if let Err(e) = library::prepare_podcast_dir(output_root, podcast_title) {
        if !options.continue_on_error {
            return Err(SyncError::Download {
                podcast: podcast_title.to_string(),
                source: e,
            });
        }

        warn!(podcast = podcast_title, error = %e, "skipping podcast");
        summary.record_failure(podcast_title, None, &e);
        for item in &feed.items {
            counts.failed += 1;
            reporter.report(ProgressEvent::EpisodeProcessed {
                podcast_title: podcast_title.to_string(),
                episode_title: item.title().unwrap_or(UNTITLED).to_string(),
                outcome: EpisodeOutcome::Failed,
            });
        }
        return Ok(());
    }

    for item in &feed.items {
        let result = process_episode(client, podcast_title, item, output_root, options, reporter).await;

        let (episode_title, outcome) = match &result {
            Ok((title, outcome)) => (title.clone(), *outcome),
            Err(_) => (
                item.title().unwrap_or(UNTITLED).to_string(),
                EpisodeOutcome::Failed,
            ),
        };

        match outcome {
            EpisodeOutcome::Recorded => {
                summary.record(podcast_title, &episode_title);
                counts.downloaded += 1;
            }
            EpisodeOutcome::Skipped => counts.skipped += 1,
            EpisodeOutcome::Failed => counts.failed += 1,
        }

        reporter.report(ProgressEvent::EpisodeProcessed {
            podcast_title: podcast_title.to_string(),
            episode_title: episode_title.clone(),
            outcome,
        });

        match result {
            Ok(_) => {}
            Err(EpisodeFailure::Download(source)) if !options.continue_on_error => {
                return Err(SyncError::Download {
                    podcast: podcast_title.to_string(),
                    source,
                });
            }
            Err(failure) => {
                warn!(
                    podcast = podcast_title,
                    episode = %episode_title,
                    error = %failure,
                    "episode failed"
                );
                summary.record_failure(podcast_title, Some(episode_title.as_str()), &failure);
            }
        }
    }

    Ok(())
}

/// Discovered → Skipped, or Downloading → Tagging → Recorded
async fn process_episode<C: HttpClient>(
    client: &C,
    podcast_title: &str,
    item: &rss::Item,
    output_root: &Path,
    options: &SyncOptions,
    reporter: &SharedProgressReporter,
) -> Result<(String, EpisodeOutcome), EpisodeFailure> {
    let episode = extract_episode(item)?;
    let extension = audio_extension(&episode);

    if !library::should_download(
        output_root,
        podcast_title,
        &episode.title,
        &extension,
        options.overwrite,
    ) {
        debug!(podcast = podcast_title, episode = %episode.title, "already present");
        return Ok((episode.title, EpisodeOutcome::Skipped));
    }

    let path = library::episode_path(output_root, podcast_title, &episode.title, &extension);
    info!(podcast = podcast_title, episode = %episode.title, path = %path.display(), "downloading");

    download_audio(client, &episode, &path, reporter).await?;

    let image = match &episode.image_url {
        Some(url) => fetch_image(client, url).await,
        None => None,
    };

    tag_episode(&path, podcast_title, &episode, image.as_deref())?;

    Ok((episode.title, EpisodeOutcome::Recorded))
}
