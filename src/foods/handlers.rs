use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{BarcodeLookup, FavoriteRequest, FoodInput, ListLimit, SearchQuery};
use super::repo;
use super::repo_types::Food;
use super::services::{clamp_limit, search_pattern, validate_food};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    products::handlers::lookup_draft,
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods))
        .route("/foods/recent", get(recent_foods))
        .route("/foods/frequent", get(frequent_foods))
        .route("/foods/favorites", get(favorite_foods))
        .route("/foods/barcode/:code", get(lookup_barcode))
        .route("/foods/:id", get(get_food))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", axum::routing::post(create_food))
        .route("/foods/:id", put(update_food).delete(delete_food))
        .route("/foods/:id/favorite", put(set_favorite))
}

// --- handlers ---

/// All foods, or a name/brand search when `q` is given.
#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Food>>> {
    let foods = match p.q.as_deref() {
        Some(q) => match search_pattern(q) {
            Some(pattern) => repo::search(&state.db, user_id, &pattern, clamp_limit(p.limit)).await?,
            None => Vec::new(),
        },
        None => repo::list_by_user(&state.db, user_id).await?,
    };
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn recent_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<ListLimit>,
) -> ApiResult<Json<Vec<Food>>> {
    Ok(Json(repo::recent(&state.db, user_id, clamp_limit(p.limit)).await?))
}

#[instrument(skip(state))]
pub async fn frequent_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<ListLimit>,
) -> ApiResult<Json<Vec<Food>>> {
    Ok(Json(repo::frequent(&state.db, user_id, clamp_limit(p.limit)).await?))
}

#[instrument(skip(state))]
pub async fn favorite_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Food>>> {
    Ok(Json(repo::favorites(&state.db, user_id).await?))
}

/// Library first; unknown codes fall through to the product database.
#[instrument(skip(state))]
pub async fn lookup_barcode(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(code): Path<String>,
) -> ApiResult<Json<BarcodeLookup>> {
    let code = code.trim();
    if let Some(food) = repo::find_by_barcode(&state.db, user_id, code).await? {
        return Ok(Json(BarcodeLookup::Library { food }));
    }
    let draft = lookup_draft(&state, code).await?;
    Ok(Json(BarcodeLookup::OpenFoodFacts { draft }))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Food>> {
    let food = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("food"))?;
    Ok(Json(food))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FoodInput>,
) -> ApiResult<(StatusCode, Json<Food>)> {
    let new_food = validate_food(body)?;
    let food = repo::insert(&state.db, user_id, &new_food).await?;
    info!(%user_id, food_id = %food.id, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodInput>,
) -> ApiResult<Json<Food>> {
    let new_food = validate_food(body)?;
    let food = repo::update(&state.db, user_id, id, &new_food)
        .await?
        .ok_or(ApiError::NotFound("food"))?;
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn set_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FavoriteRequest>,
) -> ApiResult<Json<Food>> {
    let food = repo::set_favorite(&state.db, user_id, id, body.is_favorite)
        .await?
        .ok_or(ApiError::NotFound("food"))?;
    Ok(Json(food))
}

/// Logged entries keep their denormalized name; their food link is cleared.
#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("food"));
    }
    info!(%user_id, food_id = %id, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}
