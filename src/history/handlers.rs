use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::Date;
use tracing::instrument;

use super::dto::{DatesQuery, HistoryQuery};
use super::services::{build_history, check_window, clamp_dates_limit, window_start, HistoryReport};
use crate::{
    auth::AuthUser,
    dates::{parse_date, today_utc},
    entries,
    error::ApiResult,
    settings,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(get_history))
        .route("/history/dates", get(logged_dates))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryReport>> {
    let days = check_window(q.days)?;
    let end = match q.end.as_deref() {
        Some(d) => parse_date(d)?,
        None => today_utc(),
    };
    let start = window_start(end, days)?;

    let settings = settings::repo::get(&state.db, user_id).await?;
    let entries = entries::repo::list_between(&state.db, user_id, start, end).await?;
    Ok(Json(build_history(end, days, entries, &settings)?))
}

#[instrument(skip(state))]
pub async fn logged_dates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DatesQuery>,
) -> ApiResult<Json<Vec<Date>>> {
    let dates = entries::repo::logged_dates(&state.db, user_id, clamp_dates_limit(q.limit)).await?;
    Ok(Json(dates))
}
