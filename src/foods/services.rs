use super::dto::FoodInput;
use super::repo_types::{FoodSource, NewFood};
use crate::error::ApiError;
use crate::nutrition::NutritionBasis;

pub const MIN_SEARCH_LEN: usize = 2;

fn trimmed(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Checks a food body and splits its macros onto the chosen basis.
pub fn validate_food(input: FoodInput) -> Result<NewFood, ApiError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !input.macros.all_finite() || input.macros.any_negative() {
        return Err(ApiError::Validation(
            "Calories, protein, carbs and fat must be zero or more".into(),
        ));
    }

    let serving_grams = input.serving_grams.filter(|g| g.is_finite() && *g > 0.0);
    if input.nutrition_basis == NutritionBasis::PerServing && serving_grams.is_none() {
        return Err(ApiError::Validation("Serving size required".into()));
    }

    let (macros_per_100g, macros_per_serving) = match input.nutrition_basis {
        NutritionBasis::Per100g => (Some(input.macros), None),
        NutritionBasis::PerServing => (None, Some(input.macros)),
    };

    Ok(NewFood {
        name,
        brand: trimmed(input.brand),
        barcode: trimmed(input.barcode),
        nutrition_basis: input.nutrition_basis,
        macros_per_100g,
        macros_per_serving,
        serving_grams,
        serving_label: trimmed(input.serving_label),
        source: input.source.unwrap_or(FoodSource::User),
        is_favorite: input.is_favorite,
    })
}

/// `ILIKE` pattern for a search box value; short queries match nothing.
pub fn search_pattern(q: &str) -> Option<String> {
    let q = q.trim();
    if q.chars().count() < MIN_SEARCH_LEN {
        return None;
    }
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 200)
}
