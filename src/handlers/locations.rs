//! Location CRUD handlers.

use crate::error::AppError;
use crate::location::{Location, LocationPatch, NewLocation};
use crate::state::AppState;
use crate::store::{self, ListQuery, SortKey, SortOrder};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

const MIN_LIMIT: u32 = 1;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    search: Option<String>,
    loca: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
    limit: Option<u32>,
}

impl ListParams {
    /// Empty-string params behave as absent; out-of-range limits are
    /// rejected, not clamped.
    fn into_query(self) -> Result<ListQuery, AppError> {
        let limit = self.limit.unwrap_or(MAX_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
            )));
        }
        Ok(ListQuery {
            search: self.search.filter(|s| !s.is_empty()),
            loca: self.loca.filter(|s| !s.is_empty()),
            sort: self.sort_by.as_deref().and_then(SortKey::parse),
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit,
        })
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("location with id {id} not found"))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Location>>, AppError> {
    let query = params.into_query()?;
    Ok(Json(store::list(&state.pool, &query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewLocation>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let created = store::insert(&state.pool, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Location>, AppError> {
    if id <= 0 {
        return Err(not_found(id));
    }
    let location = store::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(location))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<LocationPatch>,
) -> Result<Json<Location>, AppError> {
    if id <= 0 {
        return Err(not_found(id));
    }
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".into()));
    }
    if let Some(field) = patch.nulled_required_field() {
        return Err(AppError::Validation(format!("{field} cannot be null")));
    }
    let updated = store::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if id <= 0 {
        return Err(not_found(id));
    }
    if !store::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
