//! Mapping of library errors to HTTP responses.
//!
//! Every error body has the same shape: `{"detail": "<message>"}`.

use crate::error::{ErrorKind, MenuError};
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use tracing::{error, warn};

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

/// Error response body.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

/// HTTP status for each failure stage.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Download | ErrorKind::Conversion => StatusCode::BAD_REQUEST,
        ErrorKind::UnsupportedMedia => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        let status = status_for(err.kind());
        let detail = match err.kind() {
            ErrorKind::Internal => format!("Internal server error: {}", err),
            _ => err.to_string(),
        };
        Self { status, detail }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.detail);
        } else {
            warn!("{} {}", self.status, self.detail);
        }

        let body = ErrorBody {
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Turn a handler panic into a 500 with the usual body shape.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: format!("Internal server error: {}", message),
    }
    .into_response()
}
