//! HTTP surface: `POST /procesar-menu` and `GET /health`.
//!
//! [`router`] builds the complete axum application so the binary, embedders
//! and integration tests all mount exactly the same routes and middleware.

pub mod api;
pub mod error;

use crate::extract::MenuExtractor;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<MenuExtractor>,
}

impl AppState {
    pub fn new(extractor: MenuExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::handle_health))
        .route("/procesar-menu", post(api::handle_process_menu))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
