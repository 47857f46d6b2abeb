use std::sync::Arc;

use enricher_core::enrich::Enricher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Per-request values (the open transaction, the loaded person) are not
/// stored here; handlers create and pass them explicitly.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: enricher_db::DbPool,
    /// Age/gender/nationality lookups.
    pub enricher: Arc<dyn Enricher>,
}
