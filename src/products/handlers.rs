use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{convert_to_food_draft, is_valid_barcode, FoodDraft, ProductError};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/products/:barcode", get(get_product))
}

/// Fetches a product and converts it; missing products are `NotFound`.
pub async fn lookup_draft(state: &AppState, barcode: &str) -> ApiResult<FoodDraft> {
    if !is_valid_barcode(barcode) {
        return Err(ApiError::Validation("Invalid barcode".into()));
    }
    let product = state
        .products
        .fetch_product(barcode)
        .await
        .map_err(|e| match e {
            ProductError::Timeout => ApiError::Upstream("Product lookup timed out".into()),
            other => ApiError::Upstream(other.to_string()),
        })?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(convert_to_food_draft(&product))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(barcode): Path<String>,
) -> ApiResult<Json<FoodDraft>> {
    let draft = lookup_draft(&state, barcode.trim()).await?;
    info!(%user_id, barcode = %draft.barcode, "product draft built");
    Ok(Json(draft))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_lookup_returns_known_product() {
        let state = AppState::fake();
        let draft = lookup_draft(&state, "3017620422003").await.unwrap();
        assert_eq!(draft.barcode, "3017620422003");
        assert!(draft.macros_per_100g.is_some());
    }

    #[tokio::test]
    async fn unknown_and_malformed_codes_are_rejected() {
        let state = AppState::fake();
        assert!(matches!(
            lookup_draft(&state, "99999999").await,
            Err(ApiError::NotFound("product"))
        ));
        assert!(matches!(
            lookup_draft(&state, "abc").await,
            Err(ApiError::Validation(_))
        ));
    }
}
