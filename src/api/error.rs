//! API error types with structured JSON responses.
//!
//! Validation and not-found failures are detected before any side effect
//! and return immediately; everything else is caught at the request
//! boundary and reported as a 500 with a code that names the failing
//! stage. A completion-service failure always carries its own code —
//! it is never substituted into the data fields of a success response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Processing failed: {0}")]
    Processing(String),
    #[error("Completion service failed: {0}")]
    CompletionService(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "VALIDATION", detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Processing(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING", detail)
            }
            ApiError::CompletionService(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMPLETION_SERVICE",
                detail,
            ),
            ApiError::Storage(detail) => {
                tracing::error!(detail = %detail, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE",
                    "A storage error occurred".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => ApiError::Processing(e.to_string()),
            PipelineError::Completion(e) => ApiError::CompletionService(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CompletionError, ExtractionError};
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("Invalid file".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
        assert_eq!(json["error"]["message"], "Invalid file");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Patient not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn processing_returns_500_with_detail() {
        let response = ApiError::Processing("decode failed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PROCESSING");
        assert_eq!(json["error"]["message"], "decode failed");
    }

    #[tokio::test]
    async fn completion_failure_has_distinct_code() {
        let err: ApiError = PipelineError::Completion(CompletionError::Connection(
            "http://localhost:11434".into(),
        ))
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "COMPLETION_SERVICE");
    }

    #[tokio::test]
    async fn extraction_failure_maps_to_processing() {
        let err: ApiError =
            PipelineError::Extraction(ExtractionError::ImageProcessing("bad bytes".into())).into();
        let response = err.into_response();
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PROCESSING");
    }

    #[tokio::test]
    async fn storage_error_hides_detail() {
        let response = ApiError::Storage("disk io".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "STORAGE");
        assert_eq!(json["error"]["message"], "A storage error occurred");
    }
}
