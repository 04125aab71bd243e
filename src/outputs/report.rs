//! Plain-text report writer.
//!
//! The summary is persisted verbatim below a short header, under a filename
//! derived from the run timestamp and the configured date format.

use crate::config::Config;
use crate::pipeline::selection::format_date;
use chrono::NaiveDateTime;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the report for the day of `timestamp`.
pub fn report_path(
    config: &Config,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
    let date = format_date(timestamp.date(), &config.output.date_format)?;
    Ok(PathBuf::from(&config.output.reports_directory).join(format!("news_summary_{date}.txt")))
}

/// Header followed by the summary, exactly as written to disk.
pub fn render_report(summary: &str, date: &str) -> String {
    format!(
        "Daily News Summary - {date}\n\
         Note: Links in square brackets [] are clickable in most text editors.\n\n\
         {summary}"
    )
}

/// Write `summary` to the report file for `timestamp`.
///
/// # Returns
///
/// The path written to.
///
/// # Errors
///
/// Fails if the reports directory cannot be created or the file cannot be
/// written.
#[instrument(
    level = "info",
    skip_all,
    fields(reports_directory = %config.output.reports_directory)
)]
pub async fn write_report(
    summary: &str,
    timestamp: NaiveDateTime,
    config: &Config,
) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
    let dir = &config.output.reports_directory;
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(%dir, error = %e, "Failed to create reports directory");
        return Err(e.into());
    }

    let date = format_date(timestamp.date(), &config.output.date_format)?;
    let path = report_path(config, timestamp)?;
    fs::write(&path, render_report(summary, &date)).await?;
    info!(path = %path.display(), bytes = summary.len(), "Wrote summary report");
    Ok(path)
}
