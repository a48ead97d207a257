use std::sync::Arc;

/// How processing of a single feed item ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// The episode file already existed
    Skipped,
    /// The episode was downloaded, tagged and recorded in the summary
    Recorded,
    /// Extraction, download or tagging failed
    Failed,
}

/// Events emitted during podcast synchronization for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feed is being fetched
    FetchingFeed { podcast: String, url: String },

    /// All feeds are loaded and the number of items to process is known
    SyncPlanReady {
        podcast_count: usize,
        total_episodes: usize,
    },

    /// Processing of a podcast's items is starting
    PodcastStarting {
        podcast_title: String,
        episode_count: usize,
    },

    /// A download is starting
    DownloadStarting {
        episode_title: String,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// Download progress update
    DownloadProgress {
        episode_title: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// A download completed successfully
    DownloadCompleted {
        episode_title: String,
        bytes_downloaded: u64,
    },

    /// Fired exactly once for every feed item, whatever its outcome
    EpisodeProcessed {
        podcast_title: String,
        episode_title: String,
        outcome: EpisodeOutcome,
    },

    /// Sync operation completed
    SyncCompleted {
        downloaded_count: usize,
        skipped_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during synchronization.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
