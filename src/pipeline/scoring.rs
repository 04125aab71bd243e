//! Keyword and recency based priority scoring.
//!
//! An article's score is the sum of keyword hits from the keyword table
//! of its title's language plus a bonus for freshness:
//!
//! | Match | Title | Description |
//! |-------|-------|-------------|
//! | critical keyword | +5 | +3 |
//! | important keyword | +3 | +1 |
//!
//! | Age | Bonus |
//! |-----|-------|
//! | < 6h | +4 |
//! | < 12h | +2 |
//! | < 24h | +1 |
//!
//! Languages without a keyword table are scored with the English one.

use crate::error::{DetectError, ScoreError};
use crate::language::LanguageDetector;
use crate::models::Article;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

/// The closed set of languages that have keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Polish,
}

/// The two keyword tiers for one language.
#[derive(Debug)]
pub struct KeywordTiers {
    pub critical: &'static [&'static str],
    pub important: &'static [&'static str],
}

static ENGLISH_KEYWORDS: KeywordTiers = KeywordTiers {
    critical: &[
        "breaking",
        "urgent",
        "critical",
        "emergency",
        "alert",
        "crisis",
        "war",
        "attack",
        "threat",
        "security",
        "defense",
    ],
    important: &[
        "announced",
        "official",
        "update",
        "major",
        "significant",
        "government",
        "minister",
        "president",
        "economy",
        "military",
    ],
};

static POLISH_KEYWORDS: KeywordTiers = KeywordTiers {
    critical: &[
        "pilne",
        "nagłe",
        "krytyczne",
        "alarmujące",
        "kryzys",
        "wojna",
        "atak",
        "zagrożenie",
        "bezpieczeństwo",
        "obrona",
        "alert",
        "ostrzeżenie",
        "niebezpieczeństwo",
    ],
    important: &[
        "ogłoszono",
        "oficjalnie",
        "ważne",
        "istotne",
        "znaczące",
        "rząd",
        "minister",
        "prezydent",
        "gospodarka",
        "wojsko",
        "premier",
        "sejm",
        "senat",
    ],
};

impl Language {
    /// Map a detector code to a supported language, if it has a table.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "en" | "eng" => Some(Language::English),
            "pl" | "pol" => Some(Language::Polish),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Polish => "pl",
        }
    }

    pub fn keywords(self) -> &'static KeywordTiers {
        match self {
            Language::English => &ENGLISH_KEYWORDS,
            Language::Polish => &POLISH_KEYWORDS,
        }
    }
}

/// Scores articles against one configuration snapshot and one clock reading.
#[derive(Debug)]
pub struct PriorityScorer<'a, D> {
    detector: &'a D,
    date_format: &'a str,
    now: NaiveDateTime,
}

impl<'a, D: LanguageDetector> PriorityScorer<'a, D> {
    pub fn new(detector: &'a D, date_format: &'a str, now: NaiveDateTime) -> Self {
        Self {
            detector,
            date_format,
            now,
        }
    }

    /// Language whose keyword table applies to `title`.
    ///
    /// Unsupported languages and titles with nothing to detect map to
    /// English; only a detector fault is an error.
    pub fn language_of(&self, title: &str) -> Result<Language, DetectError> {
        match self.detector.detect(title) {
            Ok(code) => Ok(Language::from_code(&code).unwrap_or(Language::English)),
            Err(DetectError::NoFeatures) => {
                debug!(title, "No language features in title; using English keywords");
                Ok(Language::English)
            }
            Err(e) => Err(e),
        }
    }

    pub fn try_score(&self, article: &Article) -> Result<u32, ScoreError> {
        let language = self.language_of(&article.title)?;
        let keywords = keyword_score(
            language.keywords(),
            &article.title,
            &article.description,
        );
        let recency = recency_bonus(&article.date, self.date_format, self.now);
        Ok(keywords + recency)
    }

    /// Score `article`; any internal failure is logged and scores 0.
    pub fn score(&self, article: &Article) -> u32 {
        match self.try_score(article) {
            Ok(score) => score,
            Err(e) => {
                warn!(
                    title = %article.title.chars().take(50).collect::<String>(),
                    error = %e,
                    "Error calculating priority; scoring 0"
                );
                0
            }
        }
    }
}

/// Sum keyword hits. Each keyword counts once per field it appears in.
pub fn keyword_score(tiers: &KeywordTiers, title: &str, description: &str) -> u32 {
    let title = title.to_lowercase();
    let description = description.to_lowercase();

    let tier = |words: &[&str], in_title: u32, in_description: u32| -> u32 {
        words
            .iter()
            .map(|word| {
                let mut hits = 0;
                if title.contains(word) {
                    hits += in_title;
                }
                if description.contains(word) {
                    hits += in_description;
                }
                hits
            })
            .sum()
    };

    tier(tiers.critical, 5, 3) + tier(tiers.important, 3, 1)
}

/// Freshness bonus for a date rendered with `date_format`.
///
/// A date-only format is read as midnight of that day. Dates that cannot
/// be read back earn no bonus.
pub fn recency_bonus(date: &str, date_format: &str, now: NaiveDateTime) -> u32 {
    let published = NaiveDateTime::parse_from_str(date, date_format).or_else(|_| {
        NaiveDate::parse_from_str(date, date_format).map(|d| d.and_time(NaiveTime::MIN))
    });
    let Ok(published) = published else {
        return 0;
    };

    let hours_old = (now - published).num_seconds() as f64 / 3600.0;
    if hours_old < 6.0 {
        4
    } else if hours_old < 12.0 {
        2
    } else if hours_old < 24.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::language::LanguageDetector;

    /// Detector that always answers with the same result.
    pub(crate) struct FixedDetector(pub Result<&'static str, DetectError>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Result<String, DetectError> {
            self.0.clone().map(str::to_string)
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap()
    }

    fn article(title: &str, description: &str, date: &str) -> Article {
        Article {
            title: title.to_string(),
            description: description.to_string(),
            link: "https://example.com/a".to_string(),
            source: None,
            published: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            date: date.to_string(),
            date_inferred: false,
            score: 0,
        }
    }

    const OLD: &str = "2025-05-01";

    #[test]
    fn test_breaking_adds_at_least_five() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let plain = scorer.score(&article("Storm hits the coast", "", OLD));
        let breaking = scorer.score(&article("Breaking storm hits the coast", "", OLD));
        assert!(breaking >= plain + 5);
    }

    #[test]
    fn test_recent_article_scores_four_more_than_old() {
        let detector = FixedDetector(Ok("en"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        // 03:00 on the publication day: three hours old.
        let fresh = scorer.score(&article("Storm hits the coast", "", "2025-05-10"));
        let stale = scorer.score(&article("Storm hits the coast", "", "2025-05-08"));
        assert_eq!(fresh, stale + 4);
    }

    #[test]
    fn test_recency_tiers() {
        let at = |h, m| {
            NaiveDate::from_ymd_opt(2025, 5, 10)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        assert_eq!(recency_bonus("2025-05-10", "%Y-%m-%d", at(5, 59)), 4);
        assert_eq!(recency_bonus("2025-05-10", "%Y-%m-%d", at(6, 0)), 2);
        assert_eq!(recency_bonus("2025-05-10", "%Y-%m-%d", at(11, 0)), 2);
        assert_eq!(recency_bonus("2025-05-10", "%Y-%m-%d", at(23, 0)), 1);
        assert_eq!(recency_bonus("2025-05-09", "%Y-%m-%d", at(0, 0)), 0);
    }

    #[test]
    fn test_recency_with_time_format() {
        let now = NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(recency_bonus("2025-05-10 09:00", "%Y-%m-%d %H:%M", now), 4);
    }

    #[test]
    fn test_unparseable_date_earns_no_bonus() {
        assert_eq!(recency_bonus("sometime", "%Y-%m-%d", now()), 0);
    }

    #[test]
    fn test_keyword_weights() {
        let en = Language::English.keywords();
        assert_eq!(keyword_score(en, "War declared", ""), 5);
        assert_eq!(keyword_score(en, "", "war declared"), 3);
        assert_eq!(keyword_score(en, "Minister speaks", ""), 3);
        assert_eq!(keyword_score(en, "", "the minister speaks"), 1);
        assert_eq!(keyword_score(en, "War", "war"), 8);
    }

    #[test]
    fn test_keyword_counts_once_per_field() {
        let en = Language::English.keywords();
        assert_eq!(keyword_score(en, "war war war", ""), 5);
    }

    #[test]
    fn test_substring_matching() {
        // "warning" contains "war".
        let en = Language::English.keywords();
        assert_eq!(keyword_score(en, "Weather warning", ""), 5);
    }

    #[test]
    fn test_polish_table() {
        let detector = FixedDetector(Ok("pl"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        let score = scorer.score(&article("PILNE: Sejm przyjął ustawę", "", OLD));
        assert_eq!(score, 5 + 3);
    }

    #[test]
    fn test_unsupported_language_uses_english() {
        let detector = FixedDetector(Ok("de"));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        assert_eq!(scorer.score(&article("Breaking news", "", OLD)), 5);
    }

    #[test]
    fn test_no_features_uses_english() {
        let detector = FixedDetector(Err(DetectError::NoFeatures));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        assert_eq!(scorer.score(&article("Breaking news", "", OLD)), 5);
    }

    #[test]
    fn test_detector_fault_scores_zero() {
        let detector = FixedDetector(Err(DetectError::Internal("boom".to_string())));
        let scorer = PriorityScorer::new(&detector, "%Y-%m-%d", now());
        assert!(scorer.try_score(&article("Breaking war", "", "2025-05-10")).is_err());
        assert_eq!(scorer.score(&article("Breaking war", "", "2025-05-10")), 0);
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("EN"), Some(Language::English));
        assert_eq!(Language::from_code("pol"), Some(Language::Polish));
        assert_eq!(Language::from_code("fr"), None);
    }
}
