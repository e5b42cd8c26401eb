//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become JSON bodies with the
//! matching status code. Internal errors are logged in full but only a
//! generic message reaches the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tunedl_core::JobError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller referenced a job that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body is larger than the server accepts.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))),
            ServerError::BadRequest(m) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": m })),
            ),
            ServerError::PayloadTooLarge(m) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "success": false, "error": m })),
            ),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "error": "internal server error" })),
                )
            }
        }
        .into_response()
    }
}

impl From<JobError> for ServerError {
    fn from(e: JobError) -> Self {
        match e {
            JobError::Validation(m) => ServerError::BadRequest(m),
            JobError::NotFound(m) => ServerError::NotFound(m),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn job_errors_map_to_http_classes() {
        assert!(matches!(
            ServerError::from(JobError::Validation("No URL provided.".into())),
            ServerError::BadRequest(_)
        ));
        assert!(matches!(
            ServerError::from(JobError::NotFound("Download ID not found".into())),
            ServerError::NotFound(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            ServerError::from(JobError::Io(io)),
            ServerError::Internal(_)
        ));
    }

    #[test]
    fn status_codes() {
        let resp = ServerError::BadRequest("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = ServerError::NotFound("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = ServerError::PayloadTooLarge("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let resp = ServerError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
