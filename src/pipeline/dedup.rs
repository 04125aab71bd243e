//! Near-duplicate detection by title word overlap.

use crate::models::Article;
use std::collections::HashSet;
use tracing::debug;

/// Default overlap above which two titles are the same story.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Similarity of two titles in `0.0..=1.0`.
///
/// Identical titles (ignoring case) score 1.0. Otherwise the shared
/// lowercase words are divided by the word count of the longer title.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let common = words_a.intersection(&words_b).count();
    common as f64 / words_a.len().max(words_b.len()) as f64
}

/// Drop articles whose title is more than `threshold` similar to an
/// earlier kept article. The first occurrence wins and order is kept.
pub fn remove_duplicates(articles: Vec<Article>, threshold: f64) -> Vec<Article> {
    let mut unique: Vec<Article> = Vec::with_capacity(articles.len());

    for article in articles {
        let duplicate_of = unique
            .iter()
            .find(|kept| title_similarity(&article.title, &kept.title) > threshold);
        match duplicate_of {
            Some(kept) => debug!(
                title = %article.title,
                kept = %kept.title,
                "Dropping near-duplicate article"
            ),
            None => unique.push(article),
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: String::new(),
            link: format!("https://example.com/{}", title.len()),
            source: None,
            published: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            date: "2025-05-06".to_string(),
            date_inferred: false,
            score: 0,
        }
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn test_exact_match_ignores_case() {
        assert_eq!(title_similarity("Fed Raises Rates", "fed raises rates"), 1.0);
    }

    #[test]
    fn test_overlap_divides_by_larger_set() {
        let sim = title_similarity("Fed raises rates", "Fed raises rates again");
        assert!((sim - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_title_is_dissimilar() {
        assert_eq!(title_similarity("", "Something"), 0.0);
        assert_eq!(title_similarity("   ", "Something"), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let input = || {
            vec![
                article("Fed raises rates"),
                article("Fed raises rates again"),
            ]
        };
        assert_eq!(remove_duplicates(input(), 0.7).len(), 1);
        assert_eq!(remove_duplicates(input(), 0.8).len(), 2);
        // 0.75 is not strictly above 0.75.
        assert_eq!(remove_duplicates(input(), 0.75).len(), 2);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let input = vec![
            article("Storm floods the northern coast"),
            article("Parliament passes budget"),
            article("storm floods the northern coast"),
        ];
        let output = remove_duplicates(input, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(
            titles(&output),
            vec!["Storm floods the northern coast", "Parliament passes budget"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(remove_duplicates(vec![], DEFAULT_SIMILARITY_THRESHOLD).is_empty());
    }
}
