pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers::person;
use crate::state::AppState;

/// All person routes, mounted at the root.
///
/// ```text
/// GET    /persons          list (filters + limit/offset)
/// POST   /persons          create
/// GET    /persons/{id}     fetch one
/// PUT    /persons/{id}     update
/// DELETE /persons/{id}     delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/persons", get(person::list).post(person::create))
        .route(
            "/persons/{id}",
            get(person::get_by_id)
                .put(person::update)
                .delete(person::delete),
        )
}
