use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{Macros, MealType};

/// One saved line of a template, stored in the `entries` JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub food_id: Option<Uuid>,
    pub food_name: String,
    pub amount_grams: f64,
    pub macros: Macros,
}

#[derive(Debug, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: MealType,
    pub entries: Json<Vec<TemplateEntry>>,
    pub use_count: i32,
    pub last_used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealTemplate {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: MealType,
    pub entries: Vec<TemplateEntry>,
    pub totals: Macros,
    pub use_count: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_used_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<TemplateRow> for MealTemplate {
    fn from(r: TemplateRow) -> Self {
        let entries = r.entries.0;
        let totals = entries.iter().map(|e| e.macros).sum::<Macros>().rounded();
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            meal_type: r.meal_type,
            entries,
            totals,
            use_count: r.use_count,
            last_used_at: r.last_used_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub meal_type: MealType,
    pub entries: Vec<TemplateEntry>,
}
