use axum::extract::Extension;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::server::app::AppState;

/// GET /metrics
pub async fn metrics_handler(Extension(state): Extension<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
