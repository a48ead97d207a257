//! Podcast list files.
//!
//! One `name:url` entry per line. Lines starting with `#` are comments and
//! blank lines are ignored. Only the first colon separates the name, so URLs
//! keep their scheme and port.

use std::path::Path;

use crate::error::ConfigError;

/// A podcast to synchronize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Podcast {
    pub name: String,
    pub feed_url: String,
}

impl Podcast {
    /// A podcast given directly by its feed URL, labelled with the URL itself
    pub fn from_url(url: &str) -> Self {
        Self {
            name: url.to_string(),
            feed_url: url.to_string(),
        }
    }
}

/// Parse the contents of a podcast list
///
/// A repeated name replaces the earlier entry's URL but keeps its position.
pub fn parse_podcast_list(content: &str) -> Result<Vec<Podcast>, ConfigError> {
    let mut podcasts: Vec<Podcast> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, url) = line
            .split_once(':')
            .map(|(name, url)| (name.trim(), url.trim()))
            .filter(|(name, url)| !name.is_empty() && !url.is_empty())
            .ok_or(ConfigError::InvalidListLine {
                line_number: index + 1,
            })?;

        match podcasts.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.feed_url = url.to_string(),
            None => podcasts.push(Podcast {
                name: name.to_string(),
                feed_url: url.to_string(),
            }),
        }
    }

    Ok(podcasts)
}

/// Read and parse a podcast list file
pub fn read_podcast_list(path: &Path) -> Result<Vec<Podcast>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ListFileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ListReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_podcast_list(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_entries_and_skips_comments() {
        let content = "#skip:this\nshowA:http://x/a.xml\nshowB:http://x:8080/b.xml\n";
        let podcasts = parse_podcast_list(content).unwrap();

        assert_eq!(
            podcasts,
            vec![
                Podcast {
                    name: "showA".to_string(),
                    feed_url: "http://x/a.xml".to_string(),
                },
                Podcast {
                    name: "showB".to_string(),
                    feed_url: "http://x:8080/b.xml".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ignores_blank_lines_and_surrounding_whitespace() {
        let content = "\n  showA : https://example.com/a.xml  \r\n\n";
        let podcasts = parse_podcast_list(content).unwrap();

        assert_eq!(podcasts.len(), 1);
        assert_eq!(podcasts[0].name, "showA");
        assert_eq!(podcasts[0].feed_url, "https://example.com/a.xml");
    }

    #[test]
    fn rejects_lines_without_separator() {
        let err = parse_podcast_list("showA:http://x/a.xml\njust-a-name\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListLine { line_number: 2 }));
    }

    #[test]
    fn rejects_empty_url() {
        let err = parse_podcast_list("showA:\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListLine { line_number: 1 }));
    }

    #[test]
    fn later_duplicate_replaces_url_in_place() {
        let content = "a:http://x/1.xml\nb:http://x/2.xml\na:http://x/3.xml\n";
        let podcasts = parse_podcast_list(content).unwrap();

        assert_eq!(podcasts.len(), 2);
        assert_eq!(podcasts[0].name, "a");
        assert_eq!(podcasts[0].feed_url, "http://x/3.xml");
    }

    #[test]
    fn read_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_podcast_list(&dir.path().join("podlist.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::ListFileNotFound(_)));
    }

    #[test]
    fn read_parses_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("podlist.txt");
        std::fs::write(&path, "show:https://example.com/feed.xml\n").unwrap();

        let podcasts = read_podcast_list(&path).unwrap();
        assert_eq!(podcasts, vec![Podcast {
            name: "show".to_string(),
            feed_url: "https://example.com/feed.xml".to_string(),
        }]);
    }

    #[test]
    fn from_url_uses_url_as_name() {
        let podcast = Podcast::from_url("https://example.com/feed.xml");
        assert_eq!(podcast.name, podcast.feed_url);
    }
}
