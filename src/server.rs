//! HTTP surface for the registry.
//!
//! Exposes the three core operations (submit-record, search-records,
//! list-alerts) plus record retrieval and a health check, as a JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/documents` | Submit a record payload; returns the stored record |
//! | `GET`  | `/documents/{id}` | Retrieve a stored record by id |
//! | `GET`  | `/documents` | List the current snapshot |
//! | `POST` | `/query` | Keyword search with citation evidence |
//! | `GET`  | `/alerts` | Evaluate compliance rules over the snapshot |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "validation_error", "message": "invalid record: ..." } }
//! ```
//!
//! Error codes: `validation_error` (400), `not_found` (404),
//! `durability_failure` (500), `internal` (500).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::codec;
use crate::compliance::{self, AlertsResponse};
use crate::config::Config;
use crate::error::RegistryError;
use crate::models::StoredRecord;
use crate::search::{self, SearchResponse};
use crate::store::DocumentStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<DocumentStore>,
}

/// Starts the HTTP server over an already-loaded store.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config, store: Arc<DocumentStore>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/documents", post(handle_submit).get(handle_list))
        .route("/documents/{id}", get(handle_get))
        .route("/query", post(handle_query))
        .route("/alerts", get(handle_alerts))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    tracing::info!(bind = %bind_addr, "registry server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"validation_error"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
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

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        let (status, code) = match &err {
            RegistryError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            RegistryError::Durability { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "durability_failure")
            }
            RegistryError::StoreCorrupt { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
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

// ============ POST /documents ============

/// Handler for `POST /documents`.
///
/// Decodes and validates the payload, persists it, and returns the stored
/// record including the assigned `document_id`, `version`, and
/// `ingested_at`. Returns `400` naming the offending field(s) on
/// validation failure.
async fn handle_submit(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<StoredRecord>, AppError> {
    let record = codec::decode(&payload)?;
    let stored = state.store.put(record)?;
    Ok(Json(stored))
}

// ============ GET /documents/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredRecord>, AppError> {
    let record = state.store.get(&id)?;
    Ok(Json(record))
}

// ============ GET /documents ============

async fn handle_list(State(state): State<AppState>) -> Json<Vec<StoredRecord>> {
    Json(state.store.snapshot())
}

// ============ POST /query ============

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

/// Handler for `POST /query`.
///
/// Runs keyword search over a consistent snapshot and returns ranked
/// matches with citations. An empty query returns an empty result list.
async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<SearchResponse> {
    let snapshot = state.store.snapshot();
    let mut results = search::search(&req.query, &snapshot);
    results.truncate(req.limit.unwrap_or(state.config.search.final_limit));
    Json(SearchResponse { results })
}

// ============ GET /alerts ============

async fn handle_alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    let snapshot = state.store.snapshot();
    let alerts = compliance::evaluate(&snapshot, &state.config.compliance);
    let total = alerts.len();
    Json(AlertsResponse { alerts, total })
}
