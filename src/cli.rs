//! Command-line interface definitions.
//!
//! Global options locate the configuration and link list and carry the
//! summarizer credentials; subcommands pick what to do with them. Secrets
//! can come from environment variables instead of flags.

use crate::api::DEFAULT_API_BASE;
use crate::config::DEFAULT_CONFIG_PATH;
use crate::links::DEFAULT_LINKS_PATH;
use clap::{Parser, Subcommand};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # One run: fetch feeds, summarize, write the report
/// feed_digest run
///
/// # Serve the HTTP API on a custom address
/// feed_digest --config ./config.yaml serve --bind 0.0.0.0:8080
///
/// # Manage the feed list
/// feed_digest links add https://feeds.example.com/rss
/// feed_digest links list
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml; defaults are used if the default path is missing
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to the newline-delimited feed link list
    #[arg(short, long, global = true, default_value = DEFAULT_LINKS_PATH)]
    pub links: String,

    /// API key for the summarizer
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Config path to load and whether it must exist.
    pub fn config_path(&self) -> (&str, bool) {
        match &self.config {
            Some(path) => (path.as_str(), true),
            None => (DEFAULT_CONFIG_PATH, false),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Fetch all feeds once, summarize, and write the report
    Run,

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: String,

        /// Directory served as the web UI
        #[arg(long, default_value = "static")]
        static_dir: String,
    },

    /// Inspect or edit the feed link list
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum LinksAction {
    /// Print every feed link
    List,

    /// Append a feed link
    Add {
        /// Feed URL starting with http:// or https://
        url: String,
    },
}
