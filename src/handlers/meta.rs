//! Root metadata and health endpoints.

use crate::error::AppError;
use crate::state::AppState;
use crate::store;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Locations API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "locations": "/locations",
            "seed": "/api/seed",
            "reset": "/api/reset",
            "health": "/health"
        },
        "status": "running"
    }))
}

/// Round-trip probe plus record count; 503 when the store is unreachable.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let unavailable =
        |err: AppError| AppError::Unavailable(format!("service unavailable - {err}"));

    sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|err| unavailable(AppError::Db(err)))?;
    let count = store::count(&state.pool).await.map_err(unavailable)?;

    Ok(Json(json!({
        "status": "healthy",
        "database": "connected",
        "locations_count": count,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
