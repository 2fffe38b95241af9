use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::{Macros, MealType};

#[derive(Debug, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub meal: MealType,
    pub food_id: Option<Uuid>,
    pub food_name: String,
    pub amount_grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub note: Option<String>,
    pub parent_entry_id: Option<Uuid>,
    pub is_recipe: bool,
    pub created_at: OffsetDateTime,
}

/// One logged food for a date and meal. Recipes are entries whose macros
/// were summed from their children when they were grouped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub date: Date,
    pub meal: MealType,
    pub food_id: Option<Uuid>,
    pub food_name: String,
    pub amount_grams: f64,
    pub macros: Macros,
    pub note: Option<String>,
    pub parent_entry_id: Option<Uuid>,
    pub is_recipe: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<EntryRow> for Entry {
    fn from(r: EntryRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            meal: r.meal,
            food_id: r.food_id,
            food_name: r.food_name,
            amount_grams: r.amount_grams,
            macros: Macros::new(r.calories, r.protein, r.carbs, r.fat),
            note: r.note,
            parent_entry_id: r.parent_entry_id,
            is_recipe: r.is_recipe,
            created_at: r.created_at,
        }
    }
}

/// Column values for a new entry row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: Date,
    pub meal: MealType,
    pub food_id: Option<Uuid>,
    pub food_name: String,
    pub amount_grams: f64,
    pub macros: Macros,
    pub note: Option<String>,
    pub parent_entry_id: Option<Uuid>,
    pub is_recipe: bool,
}

impl NewEntry {
    /// A fresh copy of `entry`, attached to `parent` (or top-level).
    pub fn copy_of(entry: &Entry, parent: Option<Uuid>) -> Self {
        Self {
            date: entry.date,
            meal: entry.meal,
            food_id: entry.food_id,
            food_name: entry.food_name.clone(),
            amount_grams: entry.amount_grams,
            macros: entry.macros,
            note: entry.note.clone(),
            parent_entry_id: parent,
            is_recipe: entry.is_recipe,
        }
    }
}

/// Resolved changes for an existing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChanges {
    pub meal: MealType,
    pub amount_grams: f64,
    pub macros: Macros,
    pub note: Option<String>,
}
