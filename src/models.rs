//! Data models for raw feed entries and ranked articles.
//!
//! - [`RawEntry`]: one item as delivered by a feed source, before any
//!   date resolution or scoring
//! - [`DateTuple`]: a pre-parsed timestamp as broken-down components
//! - [`Article`]: a resolved, immutable record that flows through the
//!   selector, ranker and summary builder

use chrono::NaiveDate;

/// Description used when an entry carries neither a description nor a summary.
pub const NO_DESCRIPTION: &str = "No description available";

/// A broken-down timestamp: `[year, month, day, hour, minute, second, ...]`.
///
/// Only the first six components are meaningful to the date resolver;
/// feed sources may append weekday, day-of-year and DST flags.
pub type DateTuple = Vec<i64>;

/// One raw item from a syndication source.
///
/// Every field is optional because feed producers populate them
/// inconsistently. The `*_parsed` fields hold timestamps the source was
/// able to parse strictly; the plain fields hold the text as published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Explicit source name, when the feed provides one.
    pub source: Option<String>,
    pub published_parsed: Option<DateTuple>,
    pub updated_parsed: Option<DateTuple>,
    pub created_parsed: Option<DateTuple>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
}

impl RawEntry {
    /// Title shortened for log lines.
    pub fn log_title(&self) -> String {
        let title = self.title.as_deref().unwrap_or("<untitled>");
        title.chars().take(50).collect()
    }
}

/// A news article with a resolved publication date.
///
/// Identity is title, description, link and date; `score` is derived
/// and is only meaningful relative to the configuration snapshot it was
/// computed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub link: String,
    pub source: Option<String>,
    /// Resolved publication date.
    pub published: NaiveDate,
    /// `published` rendered with the configured date format.
    pub date: String,
    /// Set when no date field could be parsed and "today" was used.
    pub date_inferred: bool,
    pub score: u32,
}

impl Article {
    /// Return the same article carrying a new score.
    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }
}
