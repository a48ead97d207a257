// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Embedding episode metadata into downloaded audio files.
//!
//! Tags are written as ID3v2.3, which nearly every player understands.
//! Artist, album and title are reduced to printable ASCII.
//!
//! Only containers that carry ID3 natively are tagged: MP3 gets the tag in
//! front of the stream, WAV gets an `id3 ` chunk inside the RIFF structure.
//! Anything else (MP4, Ogg, FLAC) is left byte for byte as downloaded.

use std::path::Path;

use id3::frame::{Comment, Picture, PictureType};
use id3::{Tag, TagLike, Version};
use tracing::debug;

use crate::error::TagError;
use crate::feed::Episode;

/// ID3 revision written to every file
pub const TAG_VERSION: Version = Version::Id3v23;

/// File extensions whose containers hold an ID3 tag
const ID3_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Write artist, album, title, description comment and cover art into `path`
///
/// An existing tag is updated in place; a file without a tag gets a new one.
/// A failure leaves the audio payload untouched. Files in containers without
/// ID3 support are rejected with [`TagError::UnsupportedFormat`] before
/// anything is written.
pub fn tag_episode(
    path: &Path,
    podcast_name: &str,
    episode: &Episode,
    image: Option<&[u8]>,
) -> Result<(), TagError> {
    if !supports_id3(path) {
        return Err(TagError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let existing = id3::no_tag_ok(Tag::read_from_path(path)).map_err(|e| TagError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut tag = existing.unwrap_or_default();

    if let Some(artist) = episode.author.as_deref().and_then(normalized) {
        tag.set_artist(artist);
    }
    if let Some(album) = normalized(podcast_name) {
        tag.set_album(album);
    }
    if let Some(title) = normalized(&episode.title) {
        tag.set_title(title);
    }

    if let Some(description) = episode.description.as_deref() {
        tag.remove_comment(Some(""), None);
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: description.to_string(),
        });
    }

    if let Some(data) = image {
        tag.remove_picture_by_type(PictureType::CoverFront);
        tag.add_frame(Picture {
            mime_type: image_mime_type(data).to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: data.to_vec(),
        });
    }

    tag.write_to_path(path, TAG_VERSION)
        .map_err(|e| TagError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!(path = %path.display(), cover = image.is_some(), "tagged episode");
    Ok(())
}

/// Whether the file's container can carry an ID3 tag, judged by extension
pub fn supports_id3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ID3_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Replace every run of characters outside printable ASCII with one space
///
/// The result is trimmed. This is lossy on purpose: it keeps tags readable
/// on players that mishandle anything but plain ASCII.
pub fn normalize_ascii(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_run = false;

    for c in s.chars() {
        if matches!(c, ' '..='~') {
            result.push(c);
            in_run = false;
        } else if !in_run {
            result.push(' ');
            in_run = true;
        }
    }

    result.trim().to_string()
}

fn normalized(s: &str) -> Option<String> {
    Some(normalize_ascii(s)).filter(|s| !s.is_empty())
}

/// Guess the MIME type of cover art from its leading bytes
fn image_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use url::Url;

    const AUDIO: &[u8] = b"fake mpeg audio payload";

    fn make_episode() -> Episode {
        Episode {
            title: "Épisode 1: Café".to_string(),
            enclosure_url: Url::parse("https://example.com/ep1.mp3").unwrap(),
            enclosure_type: None,
            link: None,
            pub_date: None,
            description: Some("All about coffee ☕".to_string()),
            author: Some("Jane Höst".to_string()),
            duration: None,
            image_url: None,
            category: None,
        }
    }

    fn minimal_episode() -> Episode {
        Episode {
            title: "Plain".to_string(),
            description: None,
            author: None,
            ..make_episode()
        }
    }

    #[test]
    fn normalize_replaces_runs_with_single_space() {
        assert_eq!(normalize_ascii("Café résumé"), "Caf r sum");
        assert_eq!(normalize_ascii("a\u{1F399}\u{FE0F}b"), "a b");
    }

    #[test]
    fn normalize_strips_control_characters() {
        assert_eq!(normalize_ascii("line1\nline2\ttab"), "line1 line2 tab");
    }

    #[test]
    fn normalize_keeps_printable_ascii() {
        assert_eq!(normalize_ascii("Episode #42 (Part 1/2)!"), "Episode #42 (Part 1/2)!");
    }

    #[test]
    fn normalize_trims_result() {
        assert_eq!(normalize_ascii("¡Hola!"), "Hola!");
        assert_eq!(normalize_ascii("日本語"), "");
    }

    #[test]
    fn tag_writes_all_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ep1.mp3");
        std::fs::write(&path, AUDIO).unwrap();

        let cover = b"\x89PNG\r\n\x1a\nrest-of-image";
        tag_episode(&path, "Coffee Talk ☕", &make_episode(), Some(cover)).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.version(), Version::Id3v23);
        assert_eq!(tag.artist(), Some("Jane H st"));
        assert_eq!(tag.album(), Some("Coffee Talk"));
        assert_eq!(tag.title(), Some("pisode 1: Caf"));

        let comments: Vec<_> = tag.comments().collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "All about coffee ☕");

        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
        assert_eq!(pictures[0].mime_type, "image/png");
        assert_eq!(pictures[0].data, cover.to_vec());
    }

    #[test]
    fn tag_keeps_audio_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ep1.mp3");
        std::fs::write(&path, AUDIO).unwrap();

        tag_episode(&path, "Show", &make_episode(), None).unwrap();

        let content = std::fs::read(&path).unwrap();
        assert!(content.starts_with(b"ID3"));
        assert!(content.ends_with(AUDIO));
    }

    #[test]
    fn tag_with_missing_optional_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.mp3");
        std::fs::write(&path, AUDIO).unwrap();

        tag_episode(&path, "Show", &minimal_episode(), None).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Plain"));
        assert_eq!(tag.album(), Some("Show"));
        assert!(tag.artist().is_none());
        assert_eq!(tag.comments().count(), 0);
        assert_eq!(tag.pictures().count(), 0);
    }

    #[test]
    fn retagging_replaces_comment_and_cover() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ep1.mp3");
        std::fs::write(&path, AUDIO).unwrap();

        tag_episode(&path, "Show", &make_episode(), Some(b"first")).unwrap();
        tag_episode(&path, "Show", &make_episode(), Some(b"second")).unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.comments().count(), 1);
        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].data, b"second".to_vec());
        assert_eq!(pictures[0].mime_type, "image/jpeg");

        let content = std::fs::read(&path).unwrap();
        assert!(content.ends_with(AUDIO));
    }

    #[test]
    fn tag_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = tag_episode(&dir.path().join("missing.mp3"), "Show", &make_episode(), None);
        assert!(matches!(result, Err(TagError::ReadFailed { .. })));
    }

    #[test]
    fn mp4_container_is_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ep1.m4a");
        let payload = b"\0\0\0\x20ftypM4A \0\0\0\0mdat";
        std::fs::write(&path, payload).unwrap();

        let result = tag_episode(&path, "Show", &make_episode(), Some(b"cover"));

        assert!(matches!(result, Err(TagError::UnsupportedFormat { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), payload.to_vec());
    }

    #[test]
    fn wav_tag_goes_into_riff_chunk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ep1.wav");
        std::fs::write(&path, minimal_wav()).unwrap();

        tag_episode(&path, "Show", &minimal_episode(), None).unwrap();

        let content = std::fs::read(&path).unwrap();
        assert!(content.starts_with(b"RIFF"));
        assert_eq!(&content[8..12], b"WAVE");

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Plain"));
        assert_eq!(tag.album(), Some("Show"));
    }

    #[test]
    fn supported_containers() {
        assert!(supports_id3(Path::new("a/ep.mp3")));
        assert!(supports_id3(Path::new("a/ep.MP3")));
        assert!(supports_id3(Path::new("a/ep.wav")));
        assert!(!supports_id3(Path::new("a/ep.m4a")));
        assert!(!supports_id3(Path::new("a/ep.ogg")));
        assert!(!supports_id3(Path::new("a/ep.opus")));
        assert!(!supports_id3(Path::new("a/ep.flac")));
        assert!(!supports_id3(Path::new("a/ep")));
    }

    /// 8 kHz mono 8-bit PCM with four samples
    fn minimal_wav() -> Vec<u8> {
        let samples = [0x80u8; 4];
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(4 + 8 + 16 + 8 + samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&8u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        wav.extend_from_slice(&samples);
        wav
    }

    #[test]
    fn image_mime_type_detection() {
        assert_eq!(image_mime_type(b"\x89PNG\r\n"), "image/png");
        assert_eq!(image_mime_type(b"GIF89a"), "image/gif");
        assert_eq!(image_mime_type(&[0xFF, 0xD8, 0xFF]), "image/jpeg");
    }
}
