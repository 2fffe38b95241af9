use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::services::{summarize_day, DaySummary};
use crate::{
    auth::AuthUser, dates::parse_date, entries, error::ApiResult, settings, state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/days/:date", get(get_day))
}

#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> ApiResult<Json<DaySummary>> {
    let date = parse_date(&date)?;
    let settings = settings::repo::get(&state.db, user_id).await?;
    let entries = entries::repo::list_for_date(&state.db, user_id, date, None).await?;
    Ok(Json(summarize_day(date, entries, &settings)))
}
