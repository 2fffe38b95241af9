use serde::{Deserialize, Deserializer};

use crate::nutrition::{Macros, MassUnit, MealType, Tolerance};

/// Partial settings update; absent fields are unchanged. `training_day` and
/// `rest_day` sent as `null` are cleared.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsPatch {
    pub preferred_unit: Option<MassUnit>,
    pub daily_targets: Option<Macros>,
    #[serde(default, deserialize_with = "present")]
    pub training_day: Option<Option<Macros>>,
    #[serde(default, deserialize_with = "present")]
    pub rest_day: Option<Option<Macros>>,
    pub tolerance: Option<Tolerance>,
    pub meal_names: Option<MealNamesPatch>,
    pub last_meal: Option<MealType>,
}

/// Marks a field that was sent, so `null` can be told apart from absent.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// A blank name restores the default label.
#[derive(Debug, Default, Deserialize)]
pub struct MealNamesPatch {
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
    pub snacks: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayTemplate {
    Training,
    Rest,
}

#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    pub template: DayTemplate,
}
