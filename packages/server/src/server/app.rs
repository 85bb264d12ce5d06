//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::error::panic_response;
use crate::server::middleware::{track_metrics, HttpMetrics};
use crate::server::routes::{
    create_pull_request_handler, create_team_handler, get_review_handler, get_team_handler,
    health_handler, merge_pull_request_handler, metrics_handler, reassign_handler,
    set_is_active_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
    pub metrics: Arc<HttpMetrics>,
}

/// Build the Axum application router
///
/// `allowed_origins` empty means any origin may call the API.
pub fn build_app(
    deps: ServerDeps,
    metrics: Arc<HttpMetrics>,
    allowed_origins: &[String],
) -> Router {
    let app_state = AppState {
        deps,
        metrics: metrics.clone(),
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Teams
        .route("/team/add", post(create_team_handler))
        .route("/team/get", get(get_team_handler))
        // Users
        .route("/users/setIsActive", post(set_is_active_handler))
        .route("/users/getReview", get(get_review_handler))
        // Pull requests
        .route("/pullRequest/create", post(create_pull_request_handler))
        .route("/pullRequest/merge", post(merge_pull_request_handler))
        .route("/pullRequest/reassign", post(reassign_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(CatchPanicLayer::custom(panic_response)) // Panics answer 500
        .layer(axum::middleware::from_fn(move |req, next| {
            track_metrics(metrics.clone(), req, next)
        })) // Request count and latency
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
