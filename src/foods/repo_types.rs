use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{FoodNutrition, Macros, NutritionBasis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "food_source", rename_all = "snake_case")]
pub enum FoodSource {
    User,
    OpenFoodFacts,
}

#[derive(Debug, FromRow)]
pub struct FoodRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub nutrition_basis: NutritionBasis,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub calories_per_serving: Option<f64>,
    pub protein_per_serving: Option<f64>,
    pub carbs_per_serving: Option<f64>,
    pub fat_per_serving: Option<f64>,
    pub serving_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub source: FoodSource,
    pub is_favorite: bool,
    pub use_count: i32,
    pub last_used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Food {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub nutrition_basis: NutritionBasis,
    pub macros_per_100g: Option<Macros>,
    pub macros_per_serving: Option<Macros>,
    pub serving_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub source: FoodSource,
    pub is_favorite: bool,
    pub use_count: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_used_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Food {
    pub fn nutrition(&self) -> FoodNutrition {
        FoodNutrition {
            basis: self.nutrition_basis,
            per_100g: self.macros_per_100g,
            per_serving: self.macros_per_serving,
            serving_grams: self.serving_grams,
        }
    }

    /// Grams to pre-fill when logging: one serving if known, else 100 g.
    pub fn default_amount_grams(&self) -> f64 {
        self.serving_grams.filter(|g| *g > 0.0).unwrap_or(100.0)
    }
}

impl From<FoodRow> for Food {
    fn from(r: FoodRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            brand: r.brand,
            barcode: r.barcode,
            nutrition_basis: r.nutrition_basis,
            macros_per_100g: Macros::from_columns(
                r.calories_per_100g,
                r.protein_per_100g,
                r.carbs_per_100g,
                r.fat_per_100g,
            ),
            macros_per_serving: Macros::from_columns(
                r.calories_per_serving,
                r.protein_per_serving,
                r.carbs_per_serving,
                r.fat_per_serving,
            ),
            serving_grams: r.serving_grams,
            serving_label: r.serving_label,
            source: r.source,
            is_favorite: r.is_favorite,
            use_count: r.use_count,
            last_used_at: r.last_used_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Validated column values for an insert or full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub nutrition_basis: NutritionBasis,
    pub macros_per_100g: Option<Macros>,
    pub macros_per_serving: Option<Macros>,
    pub serving_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub source: FoodSource,
    pub is_favorite: bool,
}
