// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presence checks against the on-disk library.
//!
//! An episode is identified by its podcast name and title and lives at
//! `<output_root>/<podcast>/<title>.<ext>`. The existence of that file is the
//! only record of a previous download.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::episode::sanitize_component;
use crate::error::DownloadError;

/// Suffix of files that are still being downloaded
pub const PARTIAL_SUFFIX: &str = "partial";

/// Folder holding all episodes of a podcast
pub fn podcast_dir(output_root: &Path, podcast_name: &str) -> PathBuf {
    output_root.join(sanitize_component(podcast_name))
}

/// Canonical location of an episode's audio file
pub fn episode_path(
    output_root: &Path,
    podcast_name: &str,
    episode_title: &str,
    extension: &str,
) -> PathBuf {
    podcast_dir(output_root, podcast_name).join(format!(
        "{}.{}",
        sanitize_component(episode_title),
        extension
    ))
}

/// Path used while an episode is being downloaded
pub fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Decide whether an episode needs to be downloaded
///
/// True when `overwrite` is set or the episode file does not exist yet.
pub fn should_download(
    output_root: &Path,
    podcast_name: &str,
    episode_title: &str,
    extension: &str,
    overwrite: bool,
) -> bool {
    overwrite || !episode_path(output_root, podcast_name, episode_title, extension).exists()
}

/// Create the podcast folder and clear out leftovers of interrupted downloads
///
/// Returns the folder path.
pub fn prepare_podcast_dir(output_root: &Path, podcast_name: &str) -> Result<PathBuf, DownloadError> {
    let dir = podcast_dir(output_root, podcast_name);

    std::fs::create_dir_all(&dir).map_err(|e| DownloadError::CreateDirectoryFailed {
        path: dir.clone(),
        source: e,
    })?;

    let removed = remove_partial_files(&dir);
    if removed > 0 {
        debug!(dir = %dir.display(), removed, "removed stale partial downloads");
    }

    Ok(dir)
}

/// Remove `*.partial` files from a directory, returning how many were removed
fn remove_partial_files(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "could not scan for partial downloads");
            return 0;
        }
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == PARTIAL_SUFFIX))
        .filter(|path| std::fs::remove_file(path).is_ok())
        .count()
}
