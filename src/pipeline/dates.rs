//! Publication date resolution for raw feed entries.
//!
//! Feed producers disagree about which date fields they fill in and how
//! they format them, so resolution walks a fixed fallback chain and never
//! fails: when nothing parses, the entry is dated "today" and flagged.

use crate::models::RawEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// Outcome of resolving one entry's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    /// No field yielded a date; `date` is the fallback "today".
    pub inferred: bool,
}

/// Formats carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
];

/// Formats with a time of day but no offset.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

/// Date-only formats.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a, %d %b %Y",
    "%A, %B %d, %Y",
];

/// Resolve the publication date of `entry`.
///
/// Fields are tried in order: parsed published, parsed updated, parsed
/// created, then the published, updated and created strings. The first
/// one yielding a valid date wins. Falls back to `today`.
pub fn resolve_date(entry: &RawEntry, today: NaiveDate) -> ResolvedDate {
    let parsed_fields = [
        ("published_parsed", &entry.published_parsed),
        ("updated_parsed", &entry.updated_parsed),
        ("created_parsed", &entry.created_parsed),
    ];
    for (field, value) in parsed_fields {
        let Some(tuple) = value.as_deref() else {
            continue;
        };
        if tuple.is_empty() {
            continue;
        }
        match date_from_tuple(tuple) {
            Some(date) => return ResolvedDate { date, inferred: false },
            None => debug!(field, ?tuple, "Malformed date tuple; trying next field"),
        }
    }

    let string_fields = [
        ("published", &entry.published),
        ("updated", &entry.updated),
        ("created", &entry.created),
    ];
    for (field, value) in string_fields {
        let Some(text) = value.as_deref() else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        match parse_date_str(text) {
            Some(date) => return ResolvedDate { date, inferred: false },
            None => debug!(field, text, "Unparseable date string; trying next field"),
        }
    }

    ResolvedDate {
        date: today,
        inferred: true,
    }
}

/// Build a date from the first six components of a broken-down timestamp.
///
/// The time components are validated as well even though only the date is
/// kept, so a tuple with an impossible hour is rejected as a whole.
pub fn date_from_tuple(tuple: &[i64]) -> Option<NaiveDate> {
    let [year, month, day, hour, minute, second, ..] = tuple else {
        return None;
    };
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(*year).ok()?,
        u32::try_from(*month).ok()?,
        u32::try_from(*day).ok()?,
    )?;
    NaiveTime::from_hms_opt(
        u32::try_from(*hour).ok()?,
        u32::try_from(*minute).ok()?,
        u32::try_from(*second).ok()?,
    )?;
    Some(date)
}

/// Permissive date parsing for free-form feed timestamps.
///
/// The date is taken as written: a timestamp with an offset keeps the
/// calendar date local to that offset rather than converting to UTC.
pub fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Some(date) = parse_with_formats(text) {
        return Some(date);
    }

    // Weekday names that disagree with the date and unknown zone
    // abbreviations ("EST", "CEST") both defeat the strict parsers.
    let stripped = strip_weekday_and_zone(text);
    if stripped != text {
        return parse_with_formats(&stripped);
    }
    None
}

fn parse_with_formats(text: &str) -> Option<NaiveDate> {
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

fn strip_weekday_and_zone(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    if let Some(first) = tokens.first() {
        let word = first.trim_end_matches(',');
        if first.ends_with(',') && word.chars().all(char::is_alphabetic) {
            tokens.remove(0);
        }
    }
    if let Some(last) = tokens.last() {
        if tokens.len() > 1 && last.chars().all(|c| c.is_ascii_uppercase()) {
            tokens.pop();
        }
    }
    tokens.join(" ")
}
