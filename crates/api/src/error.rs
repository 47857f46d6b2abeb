use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use enricher_core::error::{EnrichmentError, RepositoryError, ValidationError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors from `enricher_core` and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submitted person broke one or more field rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// One or more attribute lookups failed.
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// Not found, integrity, or storage failure from the repository.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
            ),

            AppError::Enrichment(err) => {
                tracing::warn!(error = %err, "Enrichment failed");
                (StatusCode::BAD_GATEWAY, "ENRICHMENT_FAILED", err.to_string())
            }

            AppError::Repository(err) => classify_repository_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a repository error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - Integrity and storage failures map to 500 with a sanitized message.
fn classify_repository_error(err: &RepositoryError) -> (StatusCode, &'static str, String) {
    match err {
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        RepositoryError::Integrity { .. } | RepositoryError::Storage(_) => {
            tracing::error!(error = %err, "Repository error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
