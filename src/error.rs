// Error taxonomy and terminal responder
//
// Every pipeline stage and handler either succeeds or raises exactly one
// classified `ApiError`, which flows unmodified to the `IntoResponse` impl
// below - the single point that turns failures into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::db::StoreError;

// Whether error bodies carry the diagnostic `stack` field. Production
// deployments turn this off via `ServerConfig::expose_stack`.
static EXPOSE_STACK: AtomicBool = AtomicBool::new(true);

pub fn set_expose_stack(expose: bool) {
    EXPOSE_STACK.store(expose, Ordering::Relaxed);
}

/// Classified request failure: a taxonomy kind plus an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Route id does not resolve to an existing account
    #[error("account not found")]
    NotFound,

    /// Structural/type/range failure on submitted fields; the message names
    /// the violated constraint
    #[error("{0}")]
    InvalidPayload(String),

    /// Name uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Anything unanticipated (store failure, broken stage contract)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidPayload(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message. Internal detail never leaks here.
    pub fn message(&self) -> String {
        match self {
            ApiError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound => "NotFound",
            ApiError::InvalidPayload(_) => "InvalidPayload",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Internal(_) => "Internal",
        }
    }

    fn origin(&self) -> &'static str {
        match self {
            ApiError::NotFound => "existence resolver",
            ApiError::InvalidPayload(_) => "payload validator",
            ApiError::Conflict(_) => "uniqueness validator",
            ApiError::Internal(_) => "server",
        }
    }

    /// Short failure-origin trace for the diagnostic `stack` field.
    pub fn stack(&self) -> String {
        format!("{} at {}: {}", self.kind(), self.origin(), self)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Wire shape of every failure response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        }

        let stack = EXPOSE_STACK
            .load(Ordering::Relaxed)
            .then(|| self.stack());

        let body = ErrorBody {
            message: self.message(),
            stack,
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_kind() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidPayload("budget must be a number".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("name already exists".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound.message(), "account not found");
    }

    #[test]
    fn test_internal_detail_never_reaches_message() {
        let err = ApiError::Internal("database error: table vanished".into());
        assert_eq!(err.message(), "internal server error");
        // ...but the stack keeps it for diagnostics
        assert!(err.stack().contains("table vanished"));
    }

    #[test]
    fn test_stack_names_failure_origin() {
        let err = ApiError::Conflict("name already exists".into());
        assert!(err.stack().starts_with("Conflict at uniqueness validator"));
    }

    #[test]
    fn test_store_error_classifies_as_internal() {
        let err: ApiError = StoreError::Database(rusqlite::Error::InvalidQuery).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
