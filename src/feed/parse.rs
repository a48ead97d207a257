// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::error::FeedError;

/// A parsed feed: the channel title plus its raw items in document order
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    pub items: Vec<rss::Item>,
}

/// Represents a single podcast episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub enclosure_url: Url,
    /// MIME type declared on the enclosure, if any
    pub enclosure_type: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub duration: Option<String>,
    pub image_url: Option<Url>,
    /// First plain RSS `<category>` of the item
    ///
    /// `itunes:category` is not used: the `rss` crate's iTunes item
    /// extension does not keep it, only the channel-level one.
    pub category: Option<String>,
}

/// Parse RSS feed XML bytes into a Feed
///
/// Items are kept raw so that a single broken item does not fail the
/// whole feed; use [`extract_episode`] on each of them.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Feed, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let title = channel.title().trim();
    if title.is_empty() {
        return Err(FeedError::MissingTitle);
    }

    Ok(Feed {
        title: title.to_string(),
        items: channel.items().to_vec(),
    })
}

/// Map a raw feed item into an Episode
///
/// Title and enclosure URL are required. Everything else is optional and
/// left as `None` when absent or blank.
pub fn extract_episode(item: &rss::Item) -> Result<Episode, FeedError> {
    let title = non_blank(item.title()).ok_or(FeedError::MissingTitle)?;

    let enclosure = item
        .enclosure()
        .filter(|enclosure| !enclosure.url().trim().is_empty())
        .ok_or_else(|| FeedError::MissingEnclosure {
            title: title.clone(),
        })?;

    let enclosure_url = Url::parse(enclosure.url().trim())?;

    let itunes = item.itunes_ext();

    Ok(Episode {
        title,
        enclosure_url,
        enclosure_type: non_blank(Some(enclosure.mime_type())),
        link: non_blank(item.link()),
        pub_date: non_blank(item.pub_date()),
        description: non_blank(item.description()),
        author: non_blank(itunes.and_then(|ext| ext.author())),
        duration: non_blank(itunes.and_then(|ext| ext.duration())),
        image_url: itunes
            .and_then(|ext| ext.image())
            .and_then(|href| Url::parse(href.trim()).ok()),
        category: non_blank(item.categories().first().map(|c| c.name())),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
