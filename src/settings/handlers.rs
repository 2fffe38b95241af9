use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ApplyTemplateRequest, SettingsPatch};
use super::repo;
use super::repo_types::UserSettings;
use super::services::{apply_day_template, apply_patch, reset_targets};
use crate::{auth::AuthUser, error::ApiResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).patch(update_settings))
        .route("/settings/reset-targets", post(reset_daily_targets))
        .route("/settings/apply-template", post(apply_template))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserSettings>> {
    Ok(Json(repo::get(&state.db, user_id).await?))
}

#[instrument(skip(state, patch))]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<UserSettings>> {
    let current = repo::get(&state.db, user_id).await?;
    let updated = apply_patch(current, patch)?;
    let saved = repo::save(&state.db, user_id, &updated).await?;
    info!(%user_id, "settings updated");
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn reset_daily_targets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserSettings>> {
    let current = repo::get(&state.db, user_id).await?;
    let saved = repo::save(&state.db, user_id, &reset_targets(current)).await?;
    info!(%user_id, "daily targets reset");
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn apply_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ApplyTemplateRequest>,
) -> ApiResult<Json<UserSettings>> {
    let current = repo::get(&state.db, user_id).await?;
    let updated = apply_day_template(current, body.template)?;
    let saved = repo::save(&state.db, user_id, &updated).await?;
    info!(%user_id, template = ?body.template, "day template applied");
    Ok(Json(saved))
}
