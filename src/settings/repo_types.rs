use serde::Serialize;
use sqlx::FromRow;

use crate::nutrition::{Macros, MassUnit, MealType, Tolerance};

#[derive(Debug, FromRow)]
pub struct SettingsRow {
    pub preferred_unit: MassUnit,
    pub daily_calories: f64,
    pub daily_protein: f64,
    pub daily_carbs: f64,
    pub daily_fat: f64,
    pub training_calories: Option<f64>,
    pub training_protein: Option<f64>,
    pub training_carbs: Option<f64>,
    pub training_fat: Option<f64>,
    pub rest_calories: Option<f64>,
    pub rest_protein: Option<f64>,
    pub rest_carbs: Option<f64>,
    pub rest_fat: Option<f64>,
    pub tolerance_macros: Option<f64>,
    pub tolerance_calories: Option<f64>,
    pub meal_name_breakfast: Option<String>,
    pub meal_name_lunch: Option<String>,
    pub meal_name_dinner: Option<String>,
    pub meal_name_snacks: Option<String>,
    pub last_meal: Option<MealType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealNames {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub snacks: String,
}

impl Default for MealNames {
    fn default() -> Self {
        Self {
            breakfast: MealType::Breakfast.default_label().into(),
            lunch: MealType::Lunch.default_label().into(),
            dinner: MealType::Dinner.default_label().into(),
            snacks: MealType::Snacks.default_label().into(),
        }
    }
}

impl MealNames {
    pub fn get(&self, meal: MealType) -> &str {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    pub fn get_mut(&mut self, meal: MealType) -> &mut String {
        match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        }
    }
}

/// Per-user targets and display preferences. Users without a saved row
/// get `UserSettings::default()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSettings {
    pub preferred_unit: MassUnit,
    pub daily_targets: Macros,
    pub training_day: Option<Macros>,
    pub rest_day: Option<Macros>,
    pub tolerance: Tolerance,
    pub meal_names: MealNames,
    pub last_meal: Option<MealType>,
}

pub const DEFAULT_TARGETS: Macros = Macros {
    calories: 2000.0,
    protein: 150.0,
    carbs: 200.0,
    fat: 65.0,
};

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            preferred_unit: MassUnit::G,
            daily_targets: DEFAULT_TARGETS,
            training_day: None,
            rest_day: None,
            tolerance: Tolerance::default(),
            meal_names: MealNames::default(),
            last_meal: None,
        }
    }
}

fn name_or_default(name: Option<String>, meal: MealType) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| meal.default_label().to_string())
}

impl From<SettingsRow> for UserSettings {
    fn from(r: SettingsRow) -> Self {
        let defaults = Tolerance::default();
        Self {
            preferred_unit: r.preferred_unit,
            daily_targets: Macros::new(r.daily_calories, r.daily_protein, r.daily_carbs, r.daily_fat),
            training_day: Macros::from_columns(
                r.training_calories,
                r.training_protein,
                r.training_carbs,
                r.training_fat,
            ),
            rest_day: Macros::from_columns(r.rest_calories, r.rest_protein, r.rest_carbs, r.rest_fat),
            tolerance: Tolerance {
                macros: r.tolerance_macros.unwrap_or(defaults.macros),
                calories: r.tolerance_calories.unwrap_or(defaults.calories),
            },
            meal_names: MealNames {
                breakfast: name_or_default(r.meal_name_breakfast, MealType::Breakfast),
                lunch: name_or_default(r.meal_name_lunch, MealType::Lunch),
                dinner: name_or_default(r.meal_name_dinner, MealType::Dinner),
                snacks: name_or_default(r.meal_name_snacks, MealType::Snacks),
            },
            last_meal: r.last_meal,
        }
    }
}
