//! Request handlers.

use crate::output::ProcessingResult;
use crate::server::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "menu-extract",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Query parameters of `POST /procesar-menu`.
#[derive(Debug, Deserialize)]
pub struct ProcessMenuParams {
    /// URL of the document (PDF, image, DOCX or text).
    pub pdf_url: String,
    /// Download timeout in seconds.
    pub timeout: Option<u64>,
}

/// Handler: POST /procesar-menu?pdf_url=<url>&timeout=<secs>
pub async fn handle_process_menu(
    State(state): State<AppState>,
    params: Result<Query<ProcessMenuParams>, QueryRejection>,
) -> Result<Json<ProcessingResult>, ApiError> {
    let Query(params) = params?;

    if params.timeout == Some(0) {
        return Err(ApiError::bad_request("timeout must be at least 1 second"));
    }

    info!(
        "Process request: url={}, timeout={:?}",
        params.pdf_url, params.timeout
    );

    let result = state
        .extractor
        .process_url(&params.pdf_url, params.timeout)
        .await?;

    Ok(Json(result))
}
