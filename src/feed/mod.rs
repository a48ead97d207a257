mod fetch;
mod parse;

pub use fetch::{fetch_feed, fetch_feed_bytes, is_url, load_feed, parse_feed_file, read_feed_file};
pub use parse::{Episode, Feed, extract_episode, parse_feed};
