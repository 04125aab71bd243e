//! HTTP feed source for RSS and Atom documents.
//!
//! Documents are deserialized with `quick-xml`'s serde support into a
//! single shape that covers all three common syndication formats, then
//! flattened into [`RawEntry`] values. Description markup is reduced to
//! plain text so the prompt carries words rather than tags.

use super::FeedSource;
use crate::error::FeedError;
use crate::models::{DateTuple, RawEntry};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Datelike, Timelike, Utc};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const USER_AGENT: &str = concat!("feed_digest/", env!("CARGO_PKG_VERSION"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static XML_ENCODING: Lazy<regex::bytes::Regex> = Lazy::new(|| {
    regex::bytes::Regex::new(r#"^\s*<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("valid XML declaration regex")
});

/// Fetches feeds over HTTP, one request per call.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let entries = parse_feed(&body).inspect_err(|e| {
            warn!(
                error = %e,
                preview = %truncate_for_log(&String::from_utf8_lossy(&body), 200),
                "Feed is not valid RSS/Atom"
            )
        })?;
        info!(entries = entries.len(), "Parsed feed");
        Ok(entries)
    }
}

/// Element text, tolerant of attributes, CDATA and nested markup.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: String,
}

impl TextNode {
    fn into_text(self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

fn text(node: Option<TextNode>) -> Option<String> {
    node.and_then(TextNode::into_text)
}

/// Root of any supported document. Only the fields of the actual format
/// are populated; the rest stay empty.
#[derive(Debug, Default, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    channel: Option<Channel>,
    /// RSS 1.0 places items beside the channel.
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
struct RssItem {
    title: Option<TextNode>,
    link: Option<TextNode>,
    description: Option<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<TextNode>,
    #[serde(rename = "dc:date", alias = "date")]
    dc_date: Option<TextNode>,
    source: Option<TextNode>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    published: Option<TextNode>,
    issued: Option<TextNode>,
    updated: Option<TextNode>,
    modified: Option<TextNode>,
    created: Option<TextNode>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl From<RssItem> for RawEntry {
    fn from(item: RssItem) -> Self {
        let published = text(item.pub_date).or_else(|| text(item.dc_date));
        RawEntry {
            title: text(item.title).map(|t| html_to_text(&t)),
            description: text(item.description).map(|d| html_to_text(&d)),
            summary: None,
            link: text(item.link),
            source: text(item.source),
            published_parsed: published.as_deref().and_then(strict_tuple),
            updated_parsed: None,
            created_parsed: None,
            published,
            updated: None,
            created: None,
        }
    }
}

impl From<AtomEntry> for RawEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or(entry.links.first())
            .and_then(|l| l.href.clone());
        let published = text(entry.published).or_else(|| text(entry.issued));
        let updated = text(entry.updated).or_else(|| text(entry.modified));
        let created = text(entry.created);
        RawEntry {
            title: text(entry.title).map(|t| html_to_text(&t)),
            description: None,
            summary: text(entry.summary)
                .or_else(|| text(entry.content))
                .map(|s| html_to_text(&s)),
            link,
            source: None,
            published_parsed: published.as_deref().and_then(strict_tuple),
            updated_parsed: updated.as_deref().and_then(strict_tuple),
            created_parsed: created.as_deref().and_then(strict_tuple),
            published,
            updated,
            created,
        }
    }
}

/// Parse an RSS 2.0, RSS 1.0 or Atom document into raw entries.
pub fn parse_feed(body: &[u8]) -> Result<Vec<RawEntry>, FeedError> {
    let xml = decode_document(body);
    let xml = xml.trim_start_matches('\u{feff}');
    let document: FeedDocument = quick_xml::de::from_str(xml)?;

    let rss_items = document
        .channel
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .chain(document.items)
        .map(RawEntry::from);
    let atom_entries = document.entries.into_iter().map(RawEntry::from);
    Ok(rss_items.chain(atom_entries).collect())
}

/// Decode a feed body to text.
///
/// A byte order mark wins, then the `encoding` of the XML declaration,
/// then UTF-8. A declaration naming UTF-16 in a document whose declaration
/// is readable as ASCII is treated as UTF-8.
pub fn decode_document(body: &[u8]) -> Cow<'_, str> {
    let head = &body[..body.len().min(512)];
    let declared = XML_ENCODING
        .captures(head)
        .and_then(|c| c.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .filter(|encoding| encoding.is_ascii_compatible())
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = declared.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "Feed contains bytes invalid for its encoding");
    }
    text
}

/// Broken-down UTC components for timestamps in RFC 2822 or RFC 3339 form:
/// `[year, month, day, hour, minute, second, weekday, yearday, 0]`.
pub fn strict_tuple(text: &str) -> Option<DateTuple> {
    let dt = DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()?
        .with_timezone(&Utc);
    Some(vec![
        dt.year().into(),
        dt.month().into(),
        dt.day().into(),
        dt.hour().into(),
        dt.minute().into(),
        dt.second().into(),
        dt.weekday().num_days_from_monday().into(),
        dt.ordinal().into(),
        0,
    ])
}

/// Reduce an HTML fragment to whitespace-normalized text.
pub fn html_to_text(html: &str) -> String {
    let text = if html.contains('<') {
        let fragment = Html::parse_fragment(html);
        fragment.root_element().text().collect::<Vec<_>>().join(" ")
    } else {
        html.to_string()
    };
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
