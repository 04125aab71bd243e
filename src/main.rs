//! # Feed Digest
//!
//! Turns a list of RSS/Atom feed URLs into a deduplicated, priority-ordered
//! set of articles and asks an OpenAI-compatible model to write a daily
//! news summary from them.
//!
//! ## Usage
//!
//! ```sh
//! feed_digest links add https://feeds.example.com/rss
//! feed_digest run
//! feed_digest serve --bind 127.0.0.1:5000
//! ```
//!
//! ## Architecture
//!
//! Each run is a sequential pipeline:
//! 1. **Fetching**: Download and parse each feed in link-list order
//! 2. **Selection**: Resolve dates, keep the date window, score, cap per feed
//! 3. **Ranking**: Collapse near-duplicates across feeds, rescore, cap globally
//! 4. **Summarizing**: Render the prompt and call the model, halving the
//!    article set once if the prompt is too large
//! 5. **Output**: Write the summary to a per-day report file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod language;
mod links;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod server;
mod sources;
mod utils;

use api::OpenAiSummarizer;
use cli::{Cli, Command, LinksAction};
use config::Config;
use language::WhatlangDetector;
use links::LinkStore;
use outputs::report::write_report;
use sources::rss::HttpFeedSource;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, links = %args.links, "Parsed CLI arguments");

    let links = LinkStore::new(&args.links);

    match &args.command {
        Command::Links { action } => run_links(&links, action).await,
        Command::Run => {
            let config = load_config(&args).await?;
            run_once(&args, &config, &links).await
        }
        Command::Serve { bind, static_dir } => {
            let config = load_config(&args).await?;
            serve(&args, config, links, bind, static_dir).await
        }
    }
}

async fn load_config(args: &Cli) -> Result<Config, Box<dyn Error + Send + Sync>> {
    let (path, required) = args.config_path();
    match Config::load(path, required).await {
        Ok(config) => Ok(config),
        Err(e) => {
            error!(path, error = %e, "Configuration is invalid");
            Err(e.into())
        }
    }
}

async fn run_links(
    links: &LinkStore,
    action: &LinksAction,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match action {
        LinksAction::List => {
            for link in links.load().await? {
                println!("{link}");
            }
        }
        LinksAction::Add { url } => {
            if links.add(url).await? {
                info!(%url, path = %links.path().display(), "Added feed link");
            } else {
                info!(%url, "Feed link already present");
            }
        }
    }
    Ok(())
}

async fn run_once(
    args: &Cli,
    config: &Config,
    links: &LinkStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let start_time = std::time::Instant::now();
    info!("feed_digest run starting");

    // Early check: ensure the reports directory is writable
    if let Err(e) = ensure_writable_dir(&config.output.reports_directory).await {
        error!(
            path = %config.output.reports_directory,
            error = %e,
            "Reports directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let urls = links.load().await?;
    info!(feeds = urls.len(), path = %links.path().display(), "Loaded feed links");

    let feeds = HttpFeedSource::new()?;
    let summarizer = OpenAiSummarizer::new(args.api_key.clone(), &args.api_base)?;
    let now = Local::now().naive_local();

    let summary = pipeline::generate_summary(
        &feeds,
        &summarizer,
        &WhatlangDetector,
        &urls,
        config,
        now,
    )
    .await;

    let path = write_report(&summary, now, config).await?;
    println!("{}", path.display());

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn serve(
    args: &Cli,
    config: Config,
    links: LinkStore,
    bind: &str,
    static_dir: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let state = server::AppState {
        config,
        links,
        feeds: HttpFeedSource::new()?,
        summarizer: OpenAiSummarizer::new(args.api_key.clone(), &args.api_base)?,
        detector: WhatlangDetector,
        static_dir: static_dir.into(),
    };
    let app = server::create_app(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, %static_dir, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
