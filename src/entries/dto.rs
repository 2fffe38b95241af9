use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::recipes::EntryNode;
use super::repo_types::Entry;
use crate::nutrition::{Macros, MassUnit, MealType};

/// Log an amount of a library food. Without `amount` one serving is
/// logged, or 100 g when the food has no serving size. Without `unit` the
/// amount is read in the user's preferred unit.
#[derive(Debug, Deserialize)]
pub struct LogFoodRequest {
    pub food_id: Uuid,
    pub amount: Option<f64>,
    pub unit: Option<MassUnit>,
    pub meal: Option<MealType>,
    pub date: Option<Date>,
    pub note: Option<String>,
}

/// Log macros without a food.
#[derive(Debug, Deserialize)]
pub struct QuickAddRequest {
    pub name: Option<String>,
    pub macros: Macros,
    pub meal: Option<MealType>,
    pub date: Option<Date>,
    pub note: Option<String>,
}

/// Fields left out keep their value. An empty `note` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEntryRequest {
    pub meal: Option<MealType>,
    pub amount: Option<f64>,
    pub unit: Option<MassUnit>,
    pub note: Option<String>,
    pub macros: Option<Macros>,
}

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub date: Option<String>,
    pub meal: Option<MealType>,
}

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub entry_ids: Vec<Uuid>,
    pub meal: Option<MealType>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UngroupResponse {
    pub entries: Vec<Entry>,
}

pub type EntryTree = Vec<EntryNode>;
