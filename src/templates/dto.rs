use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealTemplate, TemplateEntry};
use crate::entries::Entry;
use crate::nutrition::MealType;

/// Either `entry_ids` (snapshot logged entries) or explicit `entries`.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub entry_ids: Vec<Uuid>,
    #[serde(default)]
    pub entries: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub meal: Option<MealType>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyTemplateRequest {
    pub date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct AppliedTemplate {
    pub template: MealTemplate,
    pub entries: Vec<Entry>,
}
