//! Web API module for voronconf.
//!
//! This module provides a REST API over the compiler so a browser frontend
//! can list components, generate configurations and compare them against
//! vendor reference files.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/catalog` - List every selectable component
//! - `POST /api/generate` - Compile a selection into printer.cfg text
//! - `POST /api/download` - Return config text as a file attachment
//! - `GET /api/reference-configs` - List vendor reference configs
//! - `GET /api/reference-config` - Fetch one reference config
//!   (`?printer=&board=&revision=`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::{CatalogSummary, Registry};
use crate::config::Config;
use crate::models::RawSelection;
use crate::reference::{self, ReferenceError, ReferenceListing};
use crate::services::{compile, GenerationResponse};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// Component catalog (immutable after load)
    registry: Arc<Registry>,
}

impl AppState {
    /// Creates a new application state, loading the embedded catalog.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let registry = Registry::load()?;
        Ok(Self::with_registry(config, registry))
    }

    /// Creates a state around an already loaded registry.
    #[must_use]
    pub fn with_registry(config: Config, registry: Registry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Returns the component registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
    /// Component catalog version.
    pub catalog_version: String,
}

/// Download request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadRequest {
    /// Config text to return
    pub config: String,
    /// Attachment file name
    pub filename: Option<String>,
}

/// Reference config listing response.
#[derive(Debug, Serialize)]
pub struct ReferenceListResponse {
    /// Always true
    pub success: bool,
    /// References keyed by `printer_board_revision`
    pub configs: std::collections::BTreeMap<String, ReferenceListing>,
}

/// Query parameters selecting one reference config.
#[derive(Debug, Deserialize)]
pub struct ReferenceQuery {
    /// Printer key (default `voron2.4`)
    pub printer: Option<String>,
    /// Board family (default `leviathan`)
    pub board: Option<String>,
    /// Board revision (default `rev_d`)
    pub revision: Option<String>,
}

/// Fetched reference config.
#[derive(Debug, Serialize)]
pub struct ReferenceContentResponse {
    /// Always true
    pub success: bool,
    /// Raw config text
    pub content: String,
    /// Board and revision name
    pub name: String,
    /// Short description
    pub description: String,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Always false
    pub success: bool,
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Accepts a bare file name safe to put in a `Content-Disposition` header.
fn validate_filename(filename: &str) -> Result<&str, ApiError> {
    if filename.is_empty() {
        return Err(ApiError::new("Filename cannot be empty"));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::new("Invalid filename: path traversal not allowed"));
    }

    if filename.starts_with('.') {
        return Err(ApiError::new("Invalid filename: hidden files not allowed"));
    }

    if filename.chars().any(|c| c == '"' || c.is_control()) {
        return Err(ApiError::new("Invalid filename: quotes and control characters not allowed"));
    }

    Ok(filename)
}

/// Maps a failed fetch to 504 for timeouts and 502 for everything else.
fn fetch_failure(error: &ReferenceError) -> (StatusCode, Json<ApiError>) {
    let status = match error {
        ReferenceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ReferenceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ReferenceError::Status { .. } | ReferenceError::Fetch { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ApiError::with_details(
            "Failed to fetch reference config",
            error.to_string(),
        )),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_version: state.registry.version().to_string(),
    })
}

/// GET /api/catalog - List every category and its entries.
async fn get_catalog(State(state): State<AppState>) -> Json<CatalogSummary> {
    Json(state.registry.summary())
}

/// POST /api/generate - Compile a selection.
///
/// The body is read as raw bytes so a missing or malformed body still
/// produces a configuration built entirely from defaults.
async fn generate_config(State(state): State<AppState>, body: Bytes) -> Json<GenerationResponse> {
    let raw = RawSelection::from_json_bytes(&body);
    let document = compile(&state.registry, &raw);
    Json(GenerationResponse::with_filename(
        &document,
        state.config.output.filename.clone(),
    ))
}

/// POST /api/download - Return config text as an attachment.
async fn download_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let request: DownloadRequest = if body.is_empty() {
        DownloadRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_details("Invalid download request", e.to_string())),
            )
        })?
    };

    let filename = request
        .filename
        .as_deref()
        .unwrap_or(&state.config.output.filename);
    let filename = validate_filename(filename).map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        request.config,
    )
        .into_response())
}

/// GET /api/reference-configs - List every vendor reference config.
async fn list_reference_configs() -> Json<ReferenceListResponse> {
    Json(ReferenceListResponse {
        success: true,
        configs: reference::listing(),
    })
}

/// GET /api/reference-config - Fetch one vendor reference config.
async fn get_reference_config(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Json<ReferenceContentResponse>, (StatusCode, Json<ApiError>)> {
    let printer = query.printer.as_deref().unwrap_or("voron2.4");
    let board = query.board.as_deref().unwrap_or("leviathan");
    let revision = query.revision.as_deref().unwrap_or("rev_d");

    let entry = reference::find(printer, board, revision)
        .map_err(|e| (StatusCode::NOT_FOUND, Json(ApiError::new(e.to_string()))))?;

    let url = entry.url_via(state.config.reference.mirror.as_deref());
    let content = reference::fetch(&url, state.config.reference.timeout())
        .await
        .map_err(|e| {
            tracing::warn!("Reference fetch failed: {e}");
            fetch_failure(&e)
        })?;

    Ok(Json(ReferenceContentResponse {
        success: true,
        content,
        name: entry.name.to_string(),
        description: entry.description.to_string(),
    }))
}

// ============================================================================
// Router
// ============================================================================

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    // The server is meant to run next to a local frontend, so any origin is allowed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/catalog", get(get_catalog))
        .route("/api/generate", post(generate_config))
        .route("/api/download", post(download_config))
        .route("/api/reference-configs", get(list_reference_configs))
        .route("/api/reference-config", get(get_reference_config))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the web server.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    info!(
        "Loaded component catalog version {}",
        state.registry().version()
    );
    let app = create_router(state);

    info!("Starting voronconf web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("printer.cfg").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("a/b.cfg").is_err());
        assert!(validate_filename(".hidden").is_err());
        assert!(validate_filename("bad\"name.cfg").is_err());
    }

    #[test]
    fn test_fetch_failure_status_codes() {
        let url = "http://127.0.0.1:1/printer.cfg".to_string();
        let (status, body) = fetch_failure(&ReferenceError::Status {
            url: url.clone(),
            status: 404,
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.success);
        assert!(body.details.as_deref().unwrap().contains("HTTP 404"));

        let (status, _) = fetch_failure(&ReferenceError::Timeout {
            url,
            timeout: std::time::Duration::from_secs(1),
        });
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }
}
