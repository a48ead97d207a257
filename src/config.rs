use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::podlist::{Podcast, read_podcast_list};

/// Default podcast list file name for batch mode
pub const DEFAULT_LIST_FILE: &str = "podlist.txt";

/// Which podcasts a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// A single feed given by URL (or local path)
    Single { url: String },
    /// Every entry of a podcast list file
    Batch { list_file: PathBuf },
}

/// Validated settings for one sync run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: RunMode,
    pub output_root: PathBuf,
    pub overwrite: bool,
    pub continue_on_error: bool,
}

impl RunConfig {
    /// Check the configuration before any network activity
    ///
    /// Creates the output directory when it does not exist yet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_output_dir(&self.output_root)?;

        if let RunMode::Batch { list_file } = &self.mode
            && !list_file.is_file()
        {
            return Err(ConfigError::ListFileNotFound(list_file.clone()));
        }

        Ok(())
    }

    /// Podcasts covered by this run
    pub fn podcasts(&self) -> Result<Vec<Podcast>, ConfigError> {
        match &self.mode {
            RunMode::Single { url } => Ok(vec![Podcast::from_url(url)]),
            RunMode::Batch { list_file } => read_podcast_list(list_file),
        }
    }
}

fn ensure_output_dir(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        return Err(ConfigError::OutputIsFile(path.to_path_buf()));
    }

    std::fs::create_dir_all(path).map_err(|e| ConfigError::CreateOutputFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
