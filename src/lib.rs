pub mod config;
pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod library;
pub mod podlist;
pub mod progress;
pub mod summary;
pub mod sync;
pub mod tagger;

// Re-export main types for convenience
pub use config::{DEFAULT_LIST_FILE, RunConfig, RunMode};
pub use episode::{audio_extension, download_audio, fetch_image, sanitize_component};
pub use error::{ConfigError, DownloadError, FeedError, SyncError, TagError};
pub use feed::{Episode, Feed, extract_episode, fetch_feed, is_url, load_feed, parse_feed};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use podlist::{Podcast, parse_podcast_list, read_podcast_list};
pub use progress::{
    EpisodeOutcome, NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter,
};
pub use summary::{Failure, PodcastSummary, RunSummary};
pub use sync::{SyncOptions, sync_podcasts};
pub use tagger::tag_episode;
