//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/search?q=...&top_k=5&hot_first=true` | Search the index |
//! | `POST` | `/search` | Search with a JSON body |
//! | `POST` | `/update` | Trigger a rebuild or incremental update |
//! | `GET`  | `/stats` | Index summary statistics |
//!
//! # Error Contract
//!
//! Error responses are JSON:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing query parameter: q" } }
//! ```
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! clients can query a locally-running instance.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use memlight_core::search::SearchHit;

use crate::config::Config;
use crate::engine::Engine;
use crate::store::{BuildReport, StatsSnapshot};
use crate::watcher::WatcherHandle;

/// Shared application state passed to route handlers.
#[derive(Clone)]
struct AppState {
    engine: Engine,
}

/// Start the HTTP server, with the background watcher polling at the
/// configured interval. Runs until the process is terminated.
///
/// An empty index (fresh workspace, or a discarded record) is built
/// before the listener comes up, so the first query already sees the
/// corpus.
pub async fn run_server(config: &Config, engine: Engine) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    if engine.stats().await.total_files == 0 {
        info!("index is empty, building before serving");
        engine.build(false).await?;
    }

    let watcher = Arc::new(Mutex::new(WatcherHandle::new()));
    watcher.lock().await.start(
        engine.clone(),
        Duration::from_secs(config.watcher.interval_secs),
    );

    let app = router(engine);

    info!("listening on http://{bind_addr}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the route table. Split out so tests can drive handlers
/// without binding a socket.
pub fn router(engine: Engine) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/search", get(handle_search_get).post(handle_search_post))
        .route("/update", post(handle_update))
        .route("/stats", get(handle_stats))
        .layer(cors)
        .with_state(AppState { engine })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal_error(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: format!("{err:#}"),
    }
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

// ============ /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    top_k: Option<usize>,
    hot_first: Option<bool>,
}

#[derive(Deserialize)]
struct SearchBody {
    query: String,
    top_k: Option<usize>,
    hot_first: Option<bool>,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    count: usize,
    results: Vec<SearchHit>,
}

async fn handle_search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params
        .q
        .ok_or_else(|| bad_request("missing query parameter: q"))?;
    run_search(&state, query, params.top_k, params.hot_first).await
}

async fn handle_search_post(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, AppError> {
    run_search(&state, body.query, body.top_k, body.hot_first).await
}

async fn run_search(
    state: &AppState,
    query: String,
    top_k: Option<usize>,
    hot_first: Option<bool>,
) -> Result<Json<SearchResponse>, AppError> {
    let results = state.engine.search(&query, top_k, hot_first).await;
    Ok(Json(SearchResponse {
        query,
        count: results.len(),
        results,
    }))
}

// ============ POST /update ============

#[derive(Deserialize, Default)]
struct UpdateBody {
    /// Discard the index and rebuild from scratch instead of an
    /// incremental pass.
    #[serde(default)]
    full: bool,
}

#[derive(Serialize)]
struct UpdateResponse {
    #[serde(flatten)]
    report: BuildReport,
    stats: StatsSnapshot,
}

async fn handle_update(
    State(state): State<AppState>,
    body: Option<Json<UpdateBody>>,
) -> Result<Json<UpdateResponse>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let report = state
        .engine
        .build(!body.full)
        .await
        .map_err(internal_error)?;
    Ok(Json(UpdateResponse {
        report,
        stats: state.engine.stats().await,
    }))
}

// ============ GET /stats ============

async fn handle_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.engine.stats().await)
}
