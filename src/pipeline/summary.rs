//! Prompt rendering and the summarizer call with its degraded retry.
//!
//! The summarizer is called once with every selected article. If that
//! fails because the prompt was too large, it is called once more with
//! the first half of the article blocks. Any other failure, or a failed
//! second attempt, yields [`SUMMARY_FAILED`] instead of an error.

use crate::api::{Summarizer, SummaryRequest};
use crate::config::Config;
use crate::models::Article;
use crate::prompts::{system_prompt, user_prompt};
use crate::utils::capitalize;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Text returned in place of a summary when the summarizer cannot help.
pub const SUMMARY_FAILED: &str = "Error generating summary. Please try again.";

/// Source name used when none can be derived from the link.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Derive a display name from a link: `https://www.reuters.com/x` -> `Reuters`.
pub fn source_from_url(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return UNKNOWN_SOURCE.to_string();
    };
    let Some(host) = url.host_str() else {
        return UNKNOWN_SOURCE.to_string();
    };
    let host = host.replace("www.", "");
    match host.split('.').next().filter(|label| !label.is_empty()) {
        Some(label) => capitalize(label),
        None => UNKNOWN_SOURCE.to_string(),
    }
}

/// Cut `description` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_description(description: &str, max_chars: usize) -> String {
    match description.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &description[..byte_index]),
        None => description.to_string(),
    }
}

/// Render one article as a prompt block, terminated by a newline.
pub fn render_article(article: &Article, max_description_length: usize) -> String {
    let source = article
        .source
        .clone()
        .unwrap_or_else(|| source_from_url(&article.link));
    format!(
        "Title: {}\nSource: {}\nDate: {}\nDescription: {}\nLink: {}\n",
        article.title,
        source,
        article.date,
        truncate_description(&article.description, max_description_length),
        article.link,
    )
}

/// Builds summarizer requests for one ranked selection.
#[derive(Debug)]
pub struct SummaryRequestBuilder<'a> {
    config: &'a Config,
    system_prompt: String,
    blocks: Vec<String>,
}

impl<'a> SummaryRequestBuilder<'a> {
    pub fn new(articles: &[Article], config: &'a Config) -> Self {
        let blocks = articles
            .iter()
            .map(|article| render_article(article, config.rss.max_description_length))
            .collect();
        Self {
            config,
            system_prompt: system_prompt(config.openai.max_news_items),
            blocks,
        }
    }

    pub fn article_count(&self) -> usize {
        self.blocks.len()
    }

    /// Request carrying every article block.
    pub fn full_request(&self) -> SummaryRequest {
        self.request_for(&self.blocks)
    }

    /// Request carrying the first half of the blocks, rounded down.
    pub fn degraded_request(&self) -> SummaryRequest {
        self.request_for(&self.blocks[..self.blocks.len() / 2])
    }

    fn request_for(&self, blocks: &[String]) -> SummaryRequest {
        // Blocks end in a newline, so joining on one more leaves a blank line
        // between them.
        let articles = blocks.join("\n");
        SummaryRequest {
            system_prompt: self.system_prompt.clone(),
            user_prompt: user_prompt(&articles),
            model: self.config.openai.model.clone(),
            max_tokens: self.config.openai.max_tokens,
            temperature: self.config.openai.temperature,
        }
    }
}

/// Summarize `articles`, degrading once on a capacity error.
///
/// Never fails: summarizer errors become [`SUMMARY_FAILED`].
#[instrument(level = "info", skip_all, fields(articles = articles.len()))]
pub async fn summarize_articles<S: Summarizer>(
    summarizer: &S,
    articles: &[Article],
    config: &Config,
) -> String {
    let builder = SummaryRequestBuilder::new(articles, config);
    let t0 = Instant::now();

    let first = match summarizer.summarize(&builder.full_request()).await {
        Ok(summary) => {
            info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Summary generated");
            return summary;
        }
        Err(e) => e,
    };

    error!(error = %first, "Error during summarizer call");
    if !first.is_capacity() {
        return SUMMARY_FAILED.to_string();
    }

    let degraded = builder.degraded_request();
    warn!(
        articles = builder.article_count(),
        retained = builder.article_count() / 2,
        "Prompt exceeded model capacity; retrying once with half the articles"
    );
    match summarizer.summarize(&degraded).await {
        Ok(summary) => {
            info!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Summary generated from reduced article set"
            );
            summary
        }
        Err(e) => {
            error!(error = %e, "Error during second summarizer attempt");
            SUMMARY_FAILED.to_string()
        }
    }
}
