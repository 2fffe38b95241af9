use serde::{Deserialize, Serialize};

use super::repo_types::{Food, FoodSource};
use crate::nutrition::{Macros, NutritionBasis};
use crate::products::FoodDraft;

/// Body for creating or replacing a food. `macros` are per 100 g or per
/// serving depending on `nutrition_basis`.
#[derive(Debug, Deserialize)]
pub struct FoodInput {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    #[serde(default = "default_basis")]
    pub nutrition_basis: NutritionBasis,
    pub macros: Macros,
    pub serving_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub source: Option<FoodSource>,
    #[serde(default)]
    pub is_favorite: bool,
}

fn default_basis() -> NutritionBasis {
    NutritionBasis::Per100g
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}
fn default_search_limit() -> i64 { 50 }

#[derive(Debug, Deserialize)]
pub struct ListLimit {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}
fn default_list_limit() -> i64 { 10 }

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

/// Answer to a barcode scan: a saved library food, or a draft built from
/// product data.
#[derive(Debug, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BarcodeLookup {
    Library { food: Food },
    OpenFoodFacts { draft: FoodDraft },
}
