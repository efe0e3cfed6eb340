//! Health check handlers.

use axum::http::StatusCode;

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /ready
pub async fn ready() -> StatusCode {
    StatusCode::OK
}
