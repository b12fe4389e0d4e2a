//! HTTP server for the matching pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/match` | `{query}` → match outcome |
//! | `POST` | `/mentors/{id}/embedding` | Refresh one mentor's embedding |
//! | `POST` | `/embeddings/refresh` | Refresh every mentor (`?pending=true` for stale only) |
//! | `POST` | `/bio-summary` | `{bio}` → `{summary}` |
//!
//! # Error Contract
//!
//! Match and refresh failures are outcomes, not transport errors: they come
//! back as `200` with `success: false` and a machine-readable `code`:
//!
//! ```json
//! { "success": false, "code": "query_too_short", "message": "query must be at least 10 characters" }
//! ```
//!
//! Malformed request bodies are rejected by axum's JSON extractor.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser client
//! can call the API directly.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use haven_match_core::outcome::{MatchOutcome, RefreshOutcome};

use crate::config::Config;
use crate::db;
use crate::gemini::create_model;
use crate::matcher::Matcher;
use crate::refresh::{BatchReport, Refresher};
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
    pub refresher: Arc<Refresher>,
}

/// Build the router without binding; tests serve it on an ephemeral port.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/match", post(handle_match))
        .route("/mentors/{id}/embedding", post(handle_refresh_one))
        .route("/embeddings/refresh", post(handle_refresh_all))
        .route("/bio-summary", post(handle_bio_summary))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the database, builds the configured model client once, and serves
/// until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let model = create_model(&config.model)?;

    let state = AppState {
        matcher: Arc::new(Matcher::from_config(config, store.clone(), model.clone())),
        refresher: Arc::new(Refresher::from_config(config, store, model)),
    };

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /match ============

#[derive(Deserialize)]
struct MatchRequest {
    query: String,
}

async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Json<MatchOutcome> {
    Json(state.matcher.find_best_mentor(&req.query).await)
}

// ============ Embedding refresh ============

async fn handle_refresh_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<RefreshOutcome> {
    Json(state.refresher.update_mentor_embedding(&id).await)
}

#[derive(Deserialize, Default)]
struct RefreshParams {
    #[serde(default)]
    pending: bool,
}

/// Runs the whole batch before responding; with the default delay this
/// takes roughly five seconds per mentor.
async fn handle_refresh_all(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Json<BatchReport> {
    let report = if params.pending {
        state.refresher.refresh_pending().await
    } else {
        state.refresher.refresh_all().await
    };
    Json(report)
}

// ============ POST /bio-summary ============

#[derive(Deserialize)]
struct BioRequest {
    bio: String,
}

#[derive(Serialize)]
struct BioResponse {
    summary: String,
}

async fn handle_bio_summary(
    State(state): State<AppState>,
    Json(req): Json<BioRequest>,
) -> Json<BioResponse> {
    Json(BioResponse {
        summary: state.matcher.generate_bio_summary(&req.bio).await,
    })
}
