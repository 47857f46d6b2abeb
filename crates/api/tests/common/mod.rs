#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use enricher_api::config::ServerConfig;
use enricher_api::router::build_app_router;
use enricher_api::state::AppState;
use enricher_core::enrich::{Attribute, Enricher};
use enricher_core::error::ResolverError;
use enricher_lookup::LookupConfig;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// A name every lookup refuses to resolve.
pub const UNKNOWN_NAME: &str = "Zzyzx";

/// Answers 36 / female / GB for every name except [`UNKNOWN_NAME`].
pub struct StubEnricher;

impl StubEnricher {
    fn check(name: &str, attribute: Attribute) -> Result<(), ResolverError> {
        if name == UNKNOWN_NAME {
            Err(ResolverError::undetermined(attribute))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Enricher for StubEnricher {
    async fn age_by_name(&self, name: &str) -> Result<u32, ResolverError> {
        Self::check(name, Attribute::Age).map(|()| 36)
    }

    async fn gender_by_name(&self, name: &str) -> Result<String, ResolverError> {
        Self::check(name, Attribute::Gender).map(|()| "female".to_string())
    }

    async fn nationality_by_name(&self, name: &str) -> Result<String, ResolverError> {
        Self::check(name, Attribute::Nationality).map(|()| "GB".to_string())
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        lookup: LookupConfig::default(),
    }
}

/// Build the production router over `pool` with [`StubEnricher`] lookups.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        enricher: Arc::new(StubEnricher),
    };
    build_app_router(state, &test_config())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
