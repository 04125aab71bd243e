//! HTTP surface for generating summaries and editing the feed list.
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | `GET` | `/`, `/js/*` | Web UI from the static directory |
//! | `POST` | `/generate_summary` | Run the pipeline, write the report, return the summary |
//! | `GET` | `/api/rss-links` | List feed links |
//! | `POST` | `/api/rss-links` | Replace feed links |

use crate::api::OpenAiSummarizer;
use crate::config::Config;
use crate::language::WhatlangDetector;
use crate::links::LinkStore;
use crate::outputs::report::write_report;
use crate::pipeline::generate_summary;
use crate::sources::rss::HttpFeedSource;
use crate::utils::truncate_for_log;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, instrument};

/// Everything a request handler needs, shared across requests.
pub struct AppState {
    pub config: Config,
    pub links: LinkStore,
    pub feeds: HttpFeedSource,
    pub summarizer: OpenAiSummarizer,
    pub detector: WhatlangDetector,
    /// Directory holding `index.html` and its scripts.
    pub static_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinksBody {
    pub links: Vec<String>,
}

pub fn create_app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/generate_summary", post(generate_summary_handler))
        .route("/api/rss-links", get(list_links).post(save_links))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.to_string() })),
    )
        .into_response()
}

#[instrument(level = "info", skip_all)]
async fn generate_summary_handler(State(state): State<Arc<AppState>>) -> Response {
    let urls = match state.links.load().await {
        Ok(urls) => urls,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let now = Local::now().naive_local();
    let summary = generate_summary(
        &state.feeds,
        &state.summarizer,
        &state.detector,
        &urls,
        &state.config,
        now,
    )
    .await;

    if let Err(e) = write_report(&summary, now, &state.config).await {
        error!(error = %e, "Failed to write report");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
    }

    info!(preview = %truncate_for_log(&summary, 120), "Summary served");
    Json(json!({
        "status": "success",
        "summary": summary,
        "timestamp": now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }))
    .into_response()
}

async fn list_links(State(state): State<Arc<AppState>>) -> Response {
    match state.links.load().await {
        Ok(links) => Json(LinksBody { links }).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn save_links(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LinksBody>,
) -> Response {
    match state.links.save(&body.links).await {
        Ok(links) => {
            info!(count = links.len(), "Feed links updated over HTTP");
            Json(json!({ "status": "success" })).into_response()
        }
        Err(e @ crate::error::LinkStoreError::InvalidLink(_)) => {
            error_response(StatusCode::BAD_REQUEST, e)
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
