//! Seed and reset endpoints, guarded by the shared secret.

use crate::error::AppError;
use crate::state::AppState;
use crate::store;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct SecretParams {
    #[serde(default)]
    secret: String,
}

fn check_secret(state: &AppState, supplied: &str) -> Result<(), AppError> {
    if supplied != state.settings.seed_secret {
        return Err(AppError::Forbidden("invalid secret".into()));
    }
    Ok(())
}

/// One-shot seeding from the configured fixture file. Refuses when the table
/// already holds records; not safe under concurrent invocation (two callers
/// can both pass the emptiness check).
pub async fn seed(
    State(state): State<AppState>,
    Query(params): Query<SecretParams>,
) -> Result<Json<Value>, AppError> {
    check_secret(&state, &params.secret)?;
    if store::count(&state.pool).await? > 0 {
        return Err(AppError::Conflict("database is already seeded".into()));
    }

    let report = crate::seed::run(&state.pool, &state.settings.fixture_path).await?;
    Ok(Json(json!({
        "message": format!("seeded {} of {} records", report.inserted, report.attempted),
        "inserted": report.inserted,
        "attempted": report.attempted,
    })))
}

/// Deletes all records unconditionally. Irreversible.
pub async fn reset(
    State(state): State<AppState>,
    Query(params): Query<SecretParams>,
) -> Result<Json<Value>, AppError> {
    check_secret(&state, &params.secret)?;
    let deleted = store::delete_all(&state.pool).await?;
    tracing::info!(deleted, "reset complete");
    Ok(Json(json!({
        "message": format!("deleted {deleted} records"),
        "deleted": deleted,
    })))
}
