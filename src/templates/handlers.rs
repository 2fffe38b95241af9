use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{AppliedTemplate, ApplyTemplateRequest, CreateTemplateRequest, ListTemplatesQuery};
use super::repo;
use super::repo_types::MealTemplate;
use super::services::{linked_food_ids, new_template, plan_apply};
use crate::{
    auth::AuthUser,
    dates::date_or_today,
    entries,
    error::{ApiError, ApiResult},
    foods,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/:id", delete(delete_template))
        .route("/templates/:id/apply", post(apply_template))
}

#[instrument(skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListTemplatesQuery>,
) -> ApiResult<Json<Vec<MealTemplate>>> {
    Ok(Json(repo::list(&state.db, user_id, q.meal).await?))
}

#[instrument(skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<MealTemplate>)> {
    let logged = if body.entry_ids.is_empty() {
        Vec::new()
    } else {
        entries::repo::get_many(&state.db, user_id, &body.entry_ids).await?
    };

    let new = new_template(body, &logged)?;
    let template = repo::insert(&state.db, user_id, &new).await?;
    info!(%user_id, template_id = %template.id, lines = template.entries.len(), "template created");
    Ok((StatusCode::CREATED, Json(template)))
}

#[instrument(skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("template"));
    }
    info!(%user_id, template_id = %id, "template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Logs every template line into the template's meal and counts the use.
#[instrument(skip(state, body))]
pub async fn apply_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ApplyTemplateRequest>>,
) -> ApiResult<(StatusCode, Json<AppliedTemplate>)> {
    let Json(body) = body.unwrap_or_default();
    let template = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("template"))?;

    let known: HashSet<Uuid> = foods::repo::existing_ids(&state.db, user_id, &linked_food_ids(&template))
        .await?
        .into_iter()
        .collect();
    let planned = plan_apply(&template, date_or_today(body.date), &known);

    let mut tx = state.db.begin().await?;
    let mut logged = Vec::with_capacity(planned.len());
    for new_entry in &planned {
        logged.push(entries::repo::insert(&mut *tx, user_id, new_entry).await?);
    }
    for food_id in known.iter() {
        foods::repo::increment_usage(&mut *tx, user_id, *food_id).await?;
    }
    let template = repo::mark_used(&mut *tx, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("template"))?;
    tx.commit().await?;

    info!(%user_id, template_id = %id, logged = logged.len(), "template applied");
    Ok((
        StatusCode::CREATED,
        Json(AppliedTemplate {
            template,
            entries: logged,
        }),
    ))
}
