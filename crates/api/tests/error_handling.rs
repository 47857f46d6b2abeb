//! Tests for `AppError` to HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server or database is involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use enricher_api::error::AppError;
use enricher_core::enrich::Attribute;
use enricher_core::error::{
    EnrichmentError, RepositoryError, ResolverError, ValidationError, Violation, WriteOperation,
};
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn validation_error_returns_400_with_every_violation() {
    let err = AppError::from(ValidationError::new(vec![
        Violation::EmptyName,
        Violation::EmptySurname,
    ]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "validation failed: name can't be empty; surname can't be empty"
    );
}

#[tokio::test]
async fn enrichment_error_returns_502() {
    let err = AppError::from(EnrichmentError::new(vec![ResolverError::undetermined(
        Attribute::Gender,
    )]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "ENRICHMENT_FAILED");
    assert!(json["error"].as_str().unwrap().contains("gender"));
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::from(RepositoryError::NotFound { id: 42 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "person with id 42 not found");
}

#[tokio::test]
async fn integrity_error_returns_500_and_sanitizes_message() {
    let err = AppError::from(RepositoryError::Integrity {
        operation: WriteOperation::Delete,
        id: 7,
        affected: 2,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn storage_error_does_not_leak_driver_text() {
    let err = AppError::from(RepositoryError::storage("password authentication failed"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!json["error"]
        .as_str()
        .unwrap()
        .contains("password"));
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("body id 3 does not match path id 4".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "body id 3 does not match path id 4");
}

#[test]
fn domain_errors_convert_into_matching_variants() {
    assert_matches!(
        AppError::from(RepositoryError::NotFound { id: 1 }),
        AppError::Repository(RepositoryError::NotFound { id: 1 })
    );
    assert_matches!(
        AppError::from(ValidationError::new(vec![Violation::EmptyName])),
        AppError::Validation(_)
    );
}
