//! Feed sources that turn a feed URL into raw entries.
//!
//! The pipeline only depends on the [`FeedSource`] trait. The production
//! implementation, [`rss::HttpFeedSource`], downloads the document over
//! HTTP and parses it as RSS 2.0, RSS 1.0 (RDF) or Atom.
//!
//! | Format | Entries | Date fields read |
//! |--------|---------|------------------|
//! | RSS 2.0 | `channel/item` | `pubDate`, `dc:date` |
//! | RSS 1.0 | `item` | `dc:date` |
//! | Atom | `entry` | `published`, `issued`, `updated`, `modified`, `created` |
//!
//! Sources fail per feed: a network or parse error for one URL is returned
//! as a [`FeedError`] and the caller moves on to the next URL.

use crate::error::FeedError;
use crate::models::RawEntry;
use std::future::Future;

pub mod rss;

/// Something that can fetch and parse one feed.
pub trait FeedSource {
    /// Fetch `url` and return its entries in document order.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<RawEntry>, FeedError>> + Send;
}
