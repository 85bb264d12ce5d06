//! Mapping from domain errors to HTTP responses.
//!
//! Body shape: `{"error": {"code": "...", "message": "..."}}`. Internal
//! failures are logged here and answered with a generic message so storage
//! details never reach clients. Handler panics get the same answer.

use std::any::Any;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::common::DomainError;

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
pub struct ApiError(pub DomainError);

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(DomainError::bad_request(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound => StatusCode::NOT_FOUND,
            DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DomainError::AlreadyExists(_)
            | DomainError::AlreadyMerged
            | DomainError::NotAssigned
            | DomainError::NoCandidate => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            DomainError::Internal(source) => {
                error!(error = %source, "Internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        error_response(status, self.0.code(), message)
    }
}

fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = ErrorBody {
        error: ErrorDetail { code, message },
    };
    (status, Json(body)).into_response()
}

/// Response for a handler that panicked (used with `CatchPanicLayer`).
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Handler panicked");

    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}
