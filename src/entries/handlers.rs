use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    EntryTree, GroupRequest, ListEntriesQuery, LogFoodRequest, QuickAddRequest, UngroupResponse,
    UpdateEntryRequest,
};
use super::recipes::{build_tree, plan_group, plan_ungroup, EntryNode};
use super::repo;
use super::repo_types::Entry;
use super::services::{food_entry, log_amount_grams, pick_meal, quick_add_entry, resolve_changes};
use crate::{
    auth::AuthUser,
    dates::{date_or_today, parse_date},
    error::{ApiError, ApiResult},
    foods,
    nutrition::{MassUnit, MealType},
    settings,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries))
        .route("/entries/:id", get(get_entry))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", post(log_food))
        .route("/entries/quick", post(quick_add))
        .route("/entries/:id", axum::routing::put(update_entry).delete(delete_entry))
        .route("/entries/:id/duplicate", post(duplicate_entry))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/entries/recipes", post(group_recipe))
        .route("/entries/recipes/:id", delete(ungroup_recipe))
}

async fn meal_or_default(db: &PgPool, user_id: Uuid, requested: Option<MealType>) -> ApiResult<MealType> {
    if let Some(meal) = requested {
        return Ok(meal);
    }
    let remembered = settings::repo::last_meal(db, user_id).await?;
    Ok(pick_meal(None, remembered, OffsetDateTime::now_utc().hour()))
}

/// Only read when an amount arrives without a unit.
async fn preferred_unit(
    db: &PgPool,
    user_id: Uuid,
    amount: Option<f64>,
    unit: Option<MassUnit>,
) -> ApiResult<MassUnit> {
    match (amount, unit) {
        (Some(_), None) => Ok(settings::repo::get(db, user_id).await?.preferred_unit),
        _ => Ok(MassUnit::default()),
    }
}

async fn load_node(db: &PgPool, user_id: Uuid, entry: Entry) -> ApiResult<EntryNode> {
    let children = if entry.is_recipe {
        repo::children_of(db, user_id, entry.id).await?
    } else {
        Vec::new()
    };
    Ok(EntryNode { entry, children })
}

// --- read ---

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListEntriesQuery>,
) -> ApiResult<Json<EntryTree>> {
    let date = match q.date.as_deref() {
        Some(d) => parse_date(d)?,
        None => date_or_today(None),
    };
    let entries = repo::list_for_date(&state.db, user_id, date, q.meal).await?;
    Ok(Json(build_tree(entries)))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EntryNode>> {
    let entry = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("entry"))?;
    Ok(Json(load_node(&state.db, user_id, entry).await?))
}

// --- write ---

/// Logs a food, bumps its usage and remembers the meal, in one transaction.
#[instrument(skip(state, body))]
pub async fn log_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogFoodRequest>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let food = foods::repo::get(&state.db, user_id, body.food_id)
        .await?
        .ok_or(ApiError::NotFound("food"))?;
    let preferred = preferred_unit(&state.db, user_id, body.amount, body.unit).await?;
    let grams = log_amount_grams(&food, body.amount, body.unit, preferred)?;
    let meal = meal_or_default(&state.db, user_id, body.meal).await?;
    let new_entry = food_entry(&food, grams, date_or_today(body.date), meal, body.note);

    let mut tx = state.db.begin().await?;
    let entry = repo::insert(&mut *tx, user_id, &new_entry).await?;
    foods::repo::increment_usage(&mut *tx, user_id, food.id).await?;
    settings::repo::remember_last_meal(&mut *tx, user_id, meal).await?;
    tx.commit().await?;

    info!(%user_id, entry_id = %entry.id, food_id = %food.id, grams, "food logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, body))]
pub async fn quick_add(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<QuickAddRequest>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let meal = meal_or_default(&state.db, user_id, body.meal).await?;
    let date = date_or_today(body.date);
    let new_entry = quick_add_entry(body, date, meal)?;

    let mut tx = state.db.begin().await?;
    let entry = repo::insert(&mut *tx, user_id, &new_entry).await?;
    settings::repo::remember_last_meal(&mut *tx, user_id, meal).await?;
    tx.commit().await?;

    info!(%user_id, entry_id = %entry.id, "quick add logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> ApiResult<Json<Entry>> {
    let entry = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("entry"))?;
    let food = match entry.food_id {
        Some(food_id) => foods::repo::get(&state.db, user_id, food_id).await?,
        None => None,
    };
    let preferred = preferred_unit(&state.db, user_id, body.amount, body.unit).await?;
    let changes = resolve_changes(&entry, food.as_ref(), body, preferred)?;
    let updated = repo::update(&state.db, user_id, id, &changes)
        .await?
        .ok_or(ApiError::NotFound("entry"))?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("entry"));
    }
    info!(%user_id, entry_id = %id, "entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn duplicate_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<EntryNode>)> {
    let source = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("entry"))?;
    let children = if source.is_recipe {
        repo::children_of(&state.db, user_id, source.id).await?
    } else {
        Vec::new()
    };
    let copy = repo::duplicate(&state.db, user_id, &source, &children).await?;
    info!(%user_id, entry_id = %id, copy_id = %copy.id, "entry duplicated");
    let node = load_node(&state.db, user_id, copy).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

// --- recipes ---

#[instrument(skip(state, body))]
pub async fn group_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GroupRequest>,
) -> ApiResult<(StatusCode, Json<EntryNode>)> {
    let mut unique = body.entry_ids.clone();
    unique.sort();
    unique.dedup();
    let entries = repo::get_many(&state.db, user_id, &body.entry_ids).await?;
    if entries.len() != unique.len() {
        return Err(ApiError::NotFound("entry"));
    }

    let plan = plan_group(&body.name, &entries, body.meal, body.note)?;
    let Some((recipe, children)) = repo::create_recipe(&state.db, user_id, &plan).await? else {
        warn!(%user_id, "recipe entries changed while grouping");
        return Err(ApiError::Conflict("Entries changed, reload and try again".into()));
    };

    info!(%user_id, recipe_id = %recipe.id, children = children.len(), "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(EntryNode {
            entry: recipe,
            children,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn ungroup_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UngroupResponse>> {
    let recipe = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    let children = repo::children_of(&state.db, user_id, id).await?;
    let child_ids = plan_ungroup(&recipe, &children)?;
    let entries = repo::dissolve_recipe(&state.db, user_id, id, &child_ids).await?;
    info!(%user_id, recipe_id = %id, released = entries.len(), "recipe ungrouped");
    Ok(Json(UngroupResponse { entries }))
}
