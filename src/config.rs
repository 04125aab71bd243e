//! Run configuration loaded from `config.yaml`.
//!
//! The configuration is read once at start-up, validated, and then passed
//! by reference into every component that needs it. Changing it requires a
//! restart.

use crate::error::ConfigError;
use crate::pipeline::dedup::DEFAULT_SIMILARITY_THRESHOLD;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Default path of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// The immutable configuration snapshot for one process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rss: RssConfig,
    pub articles: ArticlesConfig,
    pub output: OutputConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    /// Entries older than `today - days_to_include` are dropped.
    pub days_to_include: u32,
    /// Descriptions longer than this many characters are cut in the prompt.
    pub max_description_length: usize,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            days_to_include: 1,
            max_description_length: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlesConfig {
    pub max_articles_per_feed: usize,
    pub max_articles_to_process: usize,
    /// Title overlap above which two articles count as the same story.
    pub similarity_threshold: f64,
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            max_articles_per_feed: 5,
            max_articles_to_process: 30,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// strftime pattern used for article dates and report filenames.
    pub date_format: String,
    pub reports_directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            reports_directory: "reports".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of items the summary is asked to contain.
    pub max_news_items: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4000,
            temperature: 0.3,
            max_news_items: 15,
        }
    }
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`.
    ///
    /// When `required` is false and the file does not exist, defaults are
    /// used instead.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(yaml) => {
                let config = Self::from_yaml(&yaml)?;
                info!("Loaded configuration");
                Ok(config)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file not found; using defaults");
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Check every limit and the date format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than 0".to_string(),
                });
            }
            Ok(())
        }

        positive("rss.days_to_include", self.rss.days_to_include.into())?;
        positive(
            "rss.max_description_length",
            self.rss.max_description_length as u64,
        )?;
        positive(
            "articles.max_articles_per_feed",
            self.articles.max_articles_per_feed as u64,
        )?;
        positive(
            "articles.max_articles_to_process",
            self.articles.max_articles_to_process as u64,
        )?;
        positive("openai.max_tokens", self.openai.max_tokens.into())?;
        positive("openai.max_news_items", self.openai.max_news_items.into())?;

        if !(0.0..=1.0).contains(&self.articles.similarity_threshold) {
            return Err(ConfigError::Invalid {
                field: "articles.similarity_threshold",
                reason: format!("{} is outside 0.0..=1.0", self.articles.similarity_threshold),
            });
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::Invalid {
                field: "openai.temperature",
                reason: format!("{} is outside 0.0..=2.0", self.openai.temperature),
            });
        }
        if self.openai.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "openai.model",
                reason: "must not be empty".to_string(),
            });
        }

        let format = &self.output.date_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid {
                field: "output.date_format",
                reason: format!("{format:?} is not a valid strftime pattern"),
            });
        }
        Ok(())
    }
}
