use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{SaveWeightRequest, WeightListQuery, WeightStatsQuery};
use super::repo;
use super::repo_types::WeightEntry;
use super::services::{clamp_limit, new_weight, weight_stats, WeightStats};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight", get(list_weights).post(save_weight))
        .route("/weight/latest", get(latest_weight))
        .route("/weight/stats", get(stats))
        .route("/weight/:id", delete(delete_weight))
}

#[instrument(skip(state, body))]
pub async fn save_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SaveWeightRequest>,
) -> ApiResult<(StatusCode, Json<WeightEntry>)> {
    let measured_at = body.measured_at.unwrap_or_else(OffsetDateTime::now_utc);
    let new = new_weight(body.weight, body.unit, measured_at, body.notes)?;
    let saved = repo::upsert(&state.db, user_id, &new).await?;
    info!(%user_id, weight_id = %saved.id, source_row_id = %saved.source_row_id, "weight saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn list_weights(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeightListQuery>,
) -> ApiResult<Json<Vec<WeightEntry>>> {
    Ok(Json(repo::list(&state.db, user_id, clamp_limit(q.limit)).await?))
}

#[instrument(skip(state))]
pub async fn latest_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<WeightEntry>> {
    let latest = repo::latest(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("weight entry"))?;
    Ok(Json(latest))
}

/// `null` until there are two readings to compare.
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeightStatsQuery>,
) -> ApiResult<Json<Option<WeightStats>>> {
    let entries = repo::list(&state.db, user_id, clamp_limit(q.limit)).await?;
    Ok(Json(weight_stats(&entries, q.unit, OffsetDateTime::now_utc())))
}

#[instrument(skip(state))]
pub async fn delete_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("weight entry"));
    }
    info!(%user_id, weight_id = %id, "weight deleted");
    Ok(StatusCode::NO_CONTENT)
}
