//! Error types for every boundary of the pipeline.
//!
//! Each collaborator gets its own enum so callers can tell a per-entry
//! problem from a per-feed one, and a capacity failure from any other
//! summarizer failure. None of the pipeline-level errors escape
//! [`crate::pipeline::generate_summary`]; they are logged and converted
//! into skipped entries, skipped feeds, zero scores or sentinel text.

use thiserror::Error;

/// Failure while loading or validating `config.yaml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure fetching or parsing a whole feed. The feed is skipped.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Failure turning one raw entry into an article. The entry is skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry has no title")]
    MissingTitle,

    #[error("entry has no link")]
    MissingLink,

    #[error("could not format date with {format:?}")]
    DateFormat { format: String },
}

/// Failure reported by the language detector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The text carried nothing to detect from (empty, digits, punctuation).
    #[error("no features in text")]
    NoFeatures,

    #[error("language detector failed: {0}")]
    Internal(String),
}

/// Failure inside the priority scorer. Scored as 0 by the caller.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("language detection failed: {0}")]
    Detect(#[from] DetectError),
}

/// Failure from the summarizer collaborator.
#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("summarizer returned no content")]
    EmptyResponse,
}

impl SummarizerError {
    /// True when the message says the request exceeded the model's input budget.
    pub fn is_capacity(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("context length") || message.contains("context_length_exceeded")
    }
}

/// Failure reading or writing the feed link list.
#[derive(Error, Debug)]
pub enum LinkStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid feed link (must start with http:// or https://): {0}")]
    InvalidLink(String),
}
