//! The ingestion and ranking pipeline.
//!
//! ```text
//! feed URLs ──► FeedSource ──► resolve dates ──► select per feed ──┐
//!                                                                  │
//!        summary ◄── summarize (degrades once) ◄── rank globally ◄─┘
//! ```
//!
//! Feeds are processed one at a time in list order. Failures are contained
//! at the smallest scope that makes sense: a bad entry is skipped, a bad
//! feed is skipped, a scoring fault scores 0, and a summarizer failure
//! becomes a fixed message. [`generate_summary`] always returns text.

pub mod dates;
pub mod dedup;
pub mod scoring;
pub mod selection;
pub mod summary;

use crate::api::Summarizer;
use crate::config::Config;
use crate::language::LanguageDetector;
use crate::models::Article;
use crate::sources::FeedSource;
use chrono::NaiveDateTime;
use scoring::PriorityScorer;
use selection::{cutoff_date, rank_articles, select_feed};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Summary text when no article survives selection.
pub const NO_ARTICLES: &str = "No news articles found for today.";

/// Fetch every feed in order and concatenate their per-feed selections.
#[instrument(level = "info", skip_all, fields(feeds = urls.len()))]
pub async fn collect_articles<F, D>(
    feeds: &F,
    urls: &[String],
    config: &Config,
    scorer: &PriorityScorer<'_, D>,
    now: NaiveDateTime,
) -> Vec<Article>
where
    F: FeedSource + Sync,
    D: LanguageDetector + Sync,
{
    let today = now.date();
    let cutoff = cutoff_date(today, config.rss.days_to_include);
    info!(
        days_to_include = config.rss.days_to_include,
        %cutoff,
        "Processing feeds"
    );

    let mut articles = Vec::new();
    for url in urls {
        match feeds.fetch(url).await {
            Ok(entries) => {
                articles.extend(select_feed(url, &entries, config, scorer, today, cutoff));
            }
            Err(e) => error!(%url, error = %e, "Error fetching feed; skipping"),
        }
    }

    info!(
        total = articles.len(),
        from = %cutoff,
        to = %today,
        "Collected articles"
    );
    articles
}

/// Run the whole pipeline for `urls` and return the summary text.
///
/// `now` is the single clock reading used for the date window and the
/// recency bonus.
#[instrument(level = "info", skip_all)]
pub async fn generate_summary<F, S, D>(
    feeds: &F,
    summarizer: &S,
    detector: &D,
    urls: &[String],
    config: &Config,
    now: NaiveDateTime,
) -> String
where
    F: FeedSource + Sync,
    S: Summarizer + Sync,
    D: LanguageDetector + Sync,
{
    let t0 = Instant::now();
    let scorer = PriorityScorer::new(detector, &config.output.date_format, now);

    let articles = collect_articles(feeds, urls, config, &scorer, now).await;
    if articles.is_empty() {
        info!("No articles survived selection; skipping summarizer");
        return NO_ARTICLES.to_string();
    }

    let ranked = rank_articles(articles, config, &scorer);
    for (i, article) in ranked.iter().enumerate() {
        let language = scorer
            .language_of(&article.title)
            .map(|l| l.code())
            .unwrap_or("??");
        info!(
            rank = i + 1,
            score = article.score,
            language,
            date_inferred = article.date_inferred,
            title = %article.title,
            "Selected article"
        );
    }

    let summary = summary::summarize_articles(summarizer, &ranked, config).await;
    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        articles = ranked.len(),
        "Pipeline complete"
    );
    summary
}
