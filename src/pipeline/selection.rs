//! Per-feed selection and global ranking.
//!
//! Selection runs once per feed: resolve dates, keep the date window,
//! score, sort, and cap. Ranking runs once over the concatenated output of
//! every feed: collapse near-duplicates, rescore, sort, and cap again.

use super::dates::resolve_date;
use super::dedup::remove_duplicates;
use super::scoring::PriorityScorer;
use crate::config::Config;
use crate::error::EntryError;
use crate::language::LanguageDetector;
use crate::models::{Article, NO_DESCRIPTION, RawEntry};
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use std::fmt::Write;
use tracing::{debug, info, instrument, warn};

/// Earliest publication date, inclusive, kept by a run.
pub fn cutoff_date(today: NaiveDate, days_to_include: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(days_to_include.into()))
        .unwrap_or(NaiveDate::MIN)
}

/// Render `date` with a strftime pattern without panicking on bad patterns.
pub fn format_date(date: NaiveDate, date_format: &str) -> Result<String, EntryError> {
    let mut out = String::new();
    write!(out, "{}", date.format(date_format)).map_err(|_| EntryError::DateFormat {
        format: date_format.to_string(),
    })?;
    Ok(out)
}

/// Turn a raw entry with an already resolved date into an [`Article`].
pub fn build_article(
    entry: &RawEntry,
    published: NaiveDate,
    date_inferred: bool,
    date_format: &str,
) -> Result<Article, EntryError> {
    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(EntryError::MissingTitle)?;
    let link = entry
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(EntryError::MissingLink)?;
    let description = entry
        .description
        .as_deref()
        .or(entry.summary.as_deref())
        .unwrap_or(NO_DESCRIPTION);

    Ok(Article {
        title: title.to_string(),
        description: description.to_string(),
        link: link.to_string(),
        source: entry.source.clone(),
        published,
        date: format_date(published, date_format)?,
        date_inferred,
        score: 0,
    })
}

/// Order by score, highest first, then by publication date, newest first.
fn by_priority(a: &Article, b: &Article) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.published.cmp(&a.published))
}

/// Select up to `max_articles_per_feed` articles from one feed's entries.
///
/// Entries older than `cutoff` are dropped; entries that cannot become an
/// article are logged and skipped without affecting their siblings.
#[instrument(level = "info", skip_all, fields(%feed_url))]
pub fn select_feed<D: LanguageDetector>(
    feed_url: &str,
    entries: &[RawEntry],
    config: &Config,
    scorer: &PriorityScorer<'_, D>,
    today: NaiveDate,
    cutoff: NaiveDate,
) -> Vec<Article> {
    let max_per_feed = config.articles.max_articles_per_feed;
    let mut within_window = 0usize;

    let mut articles: Vec<Article> = entries
        .iter()
        .filter_map(|entry| {
            let resolved = resolve_date(entry, today);
            if resolved.inferred {
                warn!(
                    title = %entry.log_title(),
                    "No valid date found for article; using today's date"
                );
            }
            if resolved.date < cutoff {
                return None;
            }
            within_window += 1;

            match build_article(
                entry,
                resolved.date,
                resolved.inferred,
                &config.output.date_format,
            ) {
                Ok(article) => Some(article),
                Err(e) => {
                    warn!(
                        title = %entry.log_title(),
                        error = %e,
                        "Error processing entry; skipping"
                    );
                    None
                }
            }
        })
        .map(|article| {
            let score = scorer.score(&article);
            article.with_score(score)
        })
        .collect();

    articles.sort_by(by_priority);
    articles.truncate(max_per_feed);

    info!(
        total_entries = entries.len(),
        within_window,
        days_to_include = config.rss.days_to_include,
        selected = articles.len(),
        max = max_per_feed,
        "Selected articles from feed"
    );
    articles
}

/// Collapse cross-feed duplicates, rescore, and keep the global top
/// `max_articles_to_process`.
#[instrument(level = "info", skip_all, fields(input = articles.len()))]
pub fn rank_articles<D: LanguageDetector>(
    articles: Vec<Article>,
    config: &Config,
    scorer: &PriorityScorer<'_, D>,
) -> Vec<Article> {
    let input = articles.len();
    let unique = remove_duplicates(articles, config.articles.similarity_threshold);
    debug!(input, unique = unique.len(), "Removed duplicate articles");

    let mut ranked: Vec<Article> = unique
        .into_iter()
        .map(|article| {
            let score = scorer.score(&article);
            article.with_score(score)
        })
        .collect();

    ranked.sort_by(by_priority);
    ranked.truncate(config.articles.max_articles_to_process);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use crate::pipeline::scoring::tests::FixedDetector;
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(20, 0, 0).unwrap()
    }

    fn entry(title: &str, date: &str) -> RawEntry {
        RawEntry {
            title: Some(title.to_string()),
            description: Some("Plain description".to_string()),
            link: Some(format!("https://example.com/{}", title.replace(' ', "-"))),
            published: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn config(per_feed: usize, global: usize) -> Config {
        let mut config = Config::default();
        config.rss.days_to_include = 1;
        config.articles.max_articles_per_feed = per_feed;
        config.articles.max_articles_to_process = global;
        config
    }

    #[test]
    fn test_cutoff_date() {
        assert_eq!(
            cutoff_date(today(), 1),
            NaiveDate::from_ymd_opt(2025, 5, 9).unwrap()
        );
        assert_eq!(
            cutoff_date(today(), 10),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()
        );
    }

    #[test]
    fn test_build_article_description_fallbacks() {
        let date = today();
        let mut raw = entry("Title", "2025-05-10");
        raw.description = None;
        raw.summary = Some("From summary".to_string());
        let article = build_article(&raw, date, false, "%Y-%m-%d").unwrap();
        assert_eq!(article.description, "From summary");
        assert_eq!(article.date, "2025-05-10");

        raw.summary = None;
        let article = build_article(&raw, date, false, "%Y-%m-%d").unwrap();
        assert_eq!(article.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_build_article_requires_title_and_link() {
        let mut raw = entry("Title", "2025-05-10");
        raw.title = Some("  ".to_string());
        assert_eq!(
            build_article(&raw, today(), false, "%Y-%m-%d"),
            Err(EntryError::MissingTitle)
        );

        let mut raw = entry("Title", "2025-05-10");
        raw.link = None;
        assert_eq!(
            build_article(&raw, today(), false, "%Y-%m-%d"),
            Err(EntryError::MissingLink)
        );
    }

    #[test]
    fn test_format_date_rejects_invalid_pattern() {
        assert!(format_date(today(), "%Y-%Q").is_err());
        assert_eq!(format_date(today(), "%d/%m/%Y").unwrap(), "10/05/2025");
    }

    #[test]
    fn test_feed_window_cap_and_order() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let config = config(2, 30);

        let mut entries: Vec<RawEntry> = (0..7)
            .map(|i| entry(&format!("Old story {i}"), "2025-04-01"))
            .collect();
        entries.push(entry("Quiet local fair", "2025-05-10"));
        entries.push(entry("Breaking war update", "2025-05-09"));
        entries.push(entry("Minister visits school", "2025-05-10"));
        assert_eq!(entries.len(), 10);

        let selected = select_feed(
            "https://feed.example",
            &entries,
            &config,
            &scorer,
            today(),
            cutoff_date(today(), 1),
        );

        assert_eq!(selected.len(), 2);
        let cutoff = cutoff_date(today(), 1);
        assert!(selected.iter().all(|a| a.published >= cutoff));
        assert_eq!(selected[0].title, "Breaking war update");
        assert_eq!(selected[1].title, "Minister visits school");
        assert!(selected[0].score >= selected[1].score);
    }

    #[test]
    fn test_equal_scores_prefer_newer() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let mut config = config(5, 30);
        config.rss.days_to_include = 5;

        let entries = vec![
            entry("Harbour opens", "2025-05-06"),
            entry("Bakery opens", "2025-05-07"),
        ];
        let selected = select_feed(
            "https://feed.example",
            &entries,
            &config,
            &scorer,
            today(),
            cutoff_date(today(), 5),
        );
        assert_eq!(selected[0].title, "Bakery opens");
        assert_eq!(selected[1].title, "Harbour opens");
    }

    #[test]
    fn test_bad_entry_does_not_stop_siblings() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let mut broken = entry("Broken", "2025-05-10");
        broken.link = None;
        let entries = vec![broken, entry("Fine", "2025-05-10")];

        let selected = select_feed(
            "https://feed.example",
            &entries,
            &config(5, 30),
            &scorer,
            today(),
            cutoff_date(today(), 1),
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].title, "Fine");
    }

    #[test]
    fn test_undated_entry_is_kept_as_today() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let mut undated = entry("Undated", "");
        undated.published = None;

        let selected = select_feed(
            "https://feed.example",
            &[undated],
            &config(5, 30),
            &scorer,
            today(),
            cutoff_date(today(), 1),
        );
        assert_eq!(selected.len(), 1);
        assert!(selected[0].date_inferred);
        assert_eq!(selected[0].published, today());
    }

    #[test]
    fn test_scoring_failure_keeps_article_with_zero() {
        let detector = FixedDetector(Err(DetectError::Internal("boom".to_string())));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let selected = select_feed(
            "https://feed.example",
            &[entry("Breaking war", "2025-05-10")],
            &config(5, 30),
            &scorer,
            today(),
            cutoff_date(today(), 1),
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].score, 0);
    }

    #[test]
    fn test_rank_dedups_sorts_and_caps() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let date = today();
        let make = |title: &str| {
            build_article(&entry(title, "2025-05-10"), date, false, "%Y-%m-%d").unwrap()
        };

        let input = vec![
            make("Local fair draws crowds"),
            make("Breaking attack on power grid"),
            make("Breaking attack on power grid"),
            make("Minister resigns"),
        ];
        let ranked = rank_articles(input, &config(5, 2), &scorer);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "Breaking attack on power grid");
        assert_eq!(ranked[1].title, "Minister resigns");
    }

    #[test]
    fn test_two_identical_feeds_yield_one_article() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let config = config(5, 30);
        let feed = vec![entry("Same story everywhere", "2025-05-10")];

        let mut all = Vec::new();
        for url in ["https://a.example/rss", "https://b.example/rss"] {
            all.extend(select_feed(
                url,
                &feed,
                &config,
                &scorer,
                today(),
                cutoff_date(today(), 1),
            ));
        }
        assert_eq!(all.len(), 2);

        let ranked = rank_articles(all, &config, &scorer);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "Same story everywhere");
    }
}
