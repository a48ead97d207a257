use sha2::{Digest, Sha256};

use crate::feed::Episode;

/// Maximum length in bytes for a single path component
const MAX_COMPONENT_LENGTH: usize = 100;

/// Name used when nothing usable is left after sanitizing
const FALLBACK_COMPONENT: &str = "untitled";

/// Hex digits of the title digest appended to shortened or fallback names
const DIGEST_HEX_LENGTH: usize = 8;

/// Turn a podcast or episode title into a safe single path component
///
/// Path separators, reserved and control characters are replaced by spaces,
/// whitespace runs collapse to one space, leading/trailing dots and spaces
/// are trimmed and the result is capped at [`MAX_COMPONENT_LENGTH`] bytes.
/// Non-ASCII letters are kept.
///
/// Names that had to be shortened, or that fell back to `untitled`, end in
/// `-<digest>` computed from the raw title, so distinct titles never share
/// a file.
pub fn sanitize_component(title: &str) -> String {
    let options = sanitize_filename::Options {
        windows: true,
        truncate: false,
        replacement: " ",
    };
    let replaced = sanitize_filename::sanitize_with_options(title, options);

    let collapsed = collapse_whitespace(&replaced);
    let trimmed = trim_dots_and_spaces(&collapsed);

    if trimmed.is_empty() {
        return with_title_digest(FALLBACK_COMPONENT, title);
    }
    if trimmed.len() <= MAX_COMPONENT_LENGTH {
        return trimmed.to_string();
    }

    let prefix = trim_dots_and_spaces(truncate_at_char_boundary(
        trimmed,
        MAX_COMPONENT_LENGTH - DIGEST_HEX_LENGTH - 1,
    ));
    with_title_digest(prefix, title)
}

fn with_title_digest(prefix: &str, title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hex: String = digest
        .iter()
        .take(DIGEST_HEX_LENGTH / 2)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    format!("{prefix}-{hex}")
}

/// Get the audio file extension for an episode
///
/// Attempts to extract from URL path or MIME type, defaults to "mp3"
pub fn audio_extension(episode: &Episode) -> String {
    if let Some(ext) = episode
        .enclosure_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|filename| filename.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| is_valid_audio_extension(ext))
    {
        return ext.to_lowercase();
    }

    if let Some(ref mime) = episode.enclosure_type
        && let Some(ext) = mime_to_extension(mime)
    {
        return ext.to_string();
    }

    "mp3".to_string()
}

/// Collapse every whitespace run into a single space
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result
}

fn trim_dots_and_spaces(s: &str) -> &str {
    s.trim_matches(|c: char| c == '.' || c == ' ')
}

fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Check if a string is a valid audio file extension
fn is_valid_audio_extension(ext: &str) -> bool {
    matches!(
        ext.to_lowercase().as_str(),
        "mp3" | "m4a" | "mp4" | "aac" | "ogg" | "opus" | "wav" | "flac"
    )
}

/// Map MIME types to file extensions
fn mime_to_extension(mime: &str) -> Option<&'static str> {
    match mime.to_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/aac" => Some("aac"),
        "audio/ogg" => Some("ogg"),
        "audio/opus" => Some("opus"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}
