//! Axum router assembly.

use crate::error;
use crate::handlers::{admin, locations, meta};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the full router: metadata, health, admin, and location CRUD, with
/// the error envelope applied to every 4xx/5xx and per-request trace logs.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(meta::root))
        .route("/health", get(meta::health))
        .route("/api/seed", post(admin::seed))
        .route("/api/reset", delete(admin::reset))
        .route("/locations", get(locations::list).post(locations::create))
        .route(
            "/locations/:id",
            get(locations::read)
                .patch(locations::update)
                .delete(locations::delete),
        )
        .layer(middleware::from_fn(error::error_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
