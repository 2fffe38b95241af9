use time::Date;

use super::dto::{QuickAddRequest, UpdateEntryRequest};
use super::repo_types::{Entry, EntryChanges, NewEntry};
use crate::error::ApiError;
use crate::foods::Food;
use crate::nutrition::{calculate_macros, macros::round1, Macros, MassUnit, MealType};

pub const QUICK_ADD_NAME: &str = "Quick Add";

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Normalises an entered amount to grams. Must be a positive number.
pub fn amount_in_grams(amount: f64, unit: MassUnit) -> Result<f64, ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be greater than zero".into()));
    }
    Ok(round1(unit.to_grams(amount)))
}

/// Grams to log for a food: the entered amount in `unit` (the user's
/// preferred unit when none was sent), else the food's default portion.
pub fn log_amount_grams(
    food: &Food,
    amount: Option<f64>,
    unit: Option<MassUnit>,
    preferred: MassUnit,
) -> Result<f64, ApiError> {
    match amount {
        Some(amount) => amount_in_grams(amount, unit.unwrap_or(preferred)),
        None => Ok(food.default_amount_grams()),
    }
}

/// The requested meal, else the one last logged to, else the slot for `hour`.
pub fn pick_meal(requested: Option<MealType>, last_meal: Option<MealType>, hour: u8) -> MealType {
    requested
        .or(last_meal)
        .unwrap_or_else(|| MealType::for_hour(hour))
}

fn quick_macros(macros: Macros) -> Result<Macros, ApiError> {
    if !macros.all_finite() || macros.any_negative() {
        return Err(ApiError::Validation(
            "Calories, protein, carbs and fat must be zero or more".into(),
        ));
    }
    if macros.is_zero() {
        return Err(ApiError::Validation("Enter at least one macro".into()));
    }
    Ok(macros.rounded())
}

pub fn food_entry(food: &Food, grams: f64, date: Date, meal: MealType, note: Option<String>) -> NewEntry {
    NewEntry {
        date,
        meal,
        food_id: Some(food.id),
        food_name: food.name.clone(),
        amount_grams: grams,
        macros: calculate_macros(&food.nutrition(), grams),
        note: clean_note(note),
        parent_entry_id: None,
        is_recipe: false,
    }
}

pub fn quick_add_entry(req: QuickAddRequest, date: Date, meal: MealType) -> Result<NewEntry, ApiError> {
    let macros = quick_macros(req.macros)?;
    let food_name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| QUICK_ADD_NAME.to_string());
    Ok(NewEntry {
        date,
        meal,
        food_id: None,
        food_name,
        amount_grams: 0.0,
        macros,
        note: clean_note(req.note),
        parent_entry_id: None,
        is_recipe: false,
    })
}

/// Works out the stored values after an edit.
///
/// A new amount is priced from the linked food. An entry whose food has been
/// deleted scales its own macros instead. Only entries without a food may
/// set macros directly, and recipe children move only with their recipe.
pub fn resolve_changes(
    entry: &Entry,
    food: Option<&Food>,
    req: UpdateEntryRequest,
    preferred: MassUnit,
) -> Result<EntryChanges, ApiError> {
    if entry.parent_entry_id.is_some() && req.meal.is_some_and(|m| m != entry.meal) {
        return Err(ApiError::Validation(
            "Move the recipe to change this entry's meal".into(),
        ));
    }

    let mut amount_grams = entry.amount_grams;
    let mut macros = entry.macros;

    if let Some(amount) = req.amount {
        if entry.is_recipe {
            return Err(ApiError::Validation(
                "A recipe's amount comes from its ingredients".into(),
            ));
        }
        let grams = amount_in_grams(amount, req.unit.unwrap_or(preferred))?;
        macros = match food {
            Some(food) => calculate_macros(&food.nutrition(), grams),
            None if entry.amount_grams > 0.0 => {
                entry.macros.scale(grams / entry.amount_grams).rounded()
            }
            None => entry.macros,
        };
        amount_grams = grams;
    }

    if let Some(direct) = req.macros {
        if entry.food_id.is_some() || entry.is_recipe {
            return Err(ApiError::Validation(
                "Only quick-add entries can set macros directly".into(),
            ));
        }
        macros = quick_macros(direct)?;
    }

    let note = match req.note {
        Some(n) => clean_note(Some(n)),
        None => entry.note.clone(),
    };

    Ok(EntryChanges {
        meal: req.meal.unwrap_or(entry.meal),
        amount_grams,
        macros,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::FoodSource;
    use crate::nutrition::NutritionBasis;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn oats() -> Food {
        Food {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Oats".into(),
            brand: None,
            barcode: None,
            nutrition_basis: NutritionBasis::Per100g,
            macros_per_100g: Some(Macros::new(389.0, 16.9, 66.3, 6.9)),
            macros_per_serving: None,
            serving_grams: None,
            serving_label: None,
            source: FoodSource::User,
            is_favorite: false,
            use_count: 0,
            last_used_at: None,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    fn logged(food: &Food, grams: f64) -> Entry {
        let e = food_entry(food, grams, date!(2024 - 02 - 01), MealType::Breakfast, None);
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: e.date,
            meal: e.meal,
            food_id: e.food_id,
            food_name: e.food_name,
            amount_grams: e.amount_grams,
            macros: e.macros,
            note: e.note,
            parent_entry_id: None,
            is_recipe: false,
            created_at: datetime!(2024-02-01 8:00 UTC),
        }
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(amount_in_grams(0.0, MassUnit::G).is_err());
        assert!(amount_in_grams(-5.0, MassUnit::G).is_err());
        assert!(amount_in_grams(f64::NAN, MassUnit::G).is_err());
        assert_eq!(amount_in_grams(2.0, MassUnit::Oz).unwrap(), 56.7);
    }

    #[test]
    fn missing_amount_logs_one_serving_or_100g() {
        let mut food = oats();
        assert_eq!(log_amount_grams(&food, None, None, MassUnit::G).unwrap(), 100.0);

        food.serving_grams = Some(40.0);
        assert_eq!(food.default_amount_grams(), 40.0);
        assert_eq!(log_amount_grams(&food, None, None, MassUnit::Oz).unwrap(), 40.0);

        food.serving_grams = Some(0.0);
        assert_eq!(food.default_amount_grams(), 100.0);
        food.serving_grams = Some(-3.0);
        assert_eq!(food.default_amount_grams(), 100.0);
    }

    #[test]
    fn bare_amount_uses_preferred_unit() {
        let food = oats();
        assert_eq!(log_amount_grams(&food, Some(2.0), None, MassUnit::Oz).unwrap(), 56.7);
        assert_eq!(log_amount_grams(&food, Some(2.0), None, MassUnit::G).unwrap(), 2.0);
        assert_eq!(
            log_amount_grams(&food, Some(2.0), Some(MassUnit::G), MassUnit::Oz).unwrap(),
            2.0
        );
        assert!(log_amount_grams(&food, Some(0.0), None, MassUnit::G).is_err());

        let entry = logged(&food, 50.0);
        let req = UpdateEntryRequest {
            amount: Some(2.0),
            ..Default::default()
        };
        let c = resolve_changes(&entry, Some(&food), req, MassUnit::Oz).unwrap();
        assert_eq!(c.amount_grams, 56.7);
    }

    #[test]
    fn meal_falls_back_to_last_then_hour() {
        assert_eq!(
            pick_meal(Some(MealType::Dinner), Some(MealType::Lunch), 8),
            MealType::Dinner
        );
        assert_eq!(pick_meal(None, Some(MealType::Lunch), 8), MealType::Lunch);
        assert_eq!(pick_meal(None, None, 8), MealType::Breakfast);
        assert_eq!(pick_meal(None, None, 23), MealType::Snacks);
    }

    #[test]
    fn food_entry_prices_amount() {
        let e = food_entry(&oats(), 50.0, date!(2024 - 02 - 01), MealType::Breakfast, Some("  ".into()));
        assert_eq!(e.macros, Macros::new(195.0, 8.5, 33.2, 3.5));
        assert_eq!(e.food_name, "Oats");
        assert_eq!(e.note, None);
        assert!(!e.is_recipe);
    }

    #[test]
    fn quick_add_defaults_name_and_rejects_zero() {
        let req = QuickAddRequest {
            name: Some(" ".into()),
            macros: Macros::new(250.0, 20.0, 0.0, 10.0),
            meal: None,
            date: None,
            note: None,
        };
        let e = quick_add_entry(req, date!(2024 - 02 - 01), MealType::Lunch).unwrap();
        assert_eq!(e.food_name, QUICK_ADD_NAME);
        assert_eq!(e.food_id, None);
        assert_eq!(e.amount_grams, 0.0);

        let zero = QuickAddRequest {
            name: None,
            macros: Macros::ZERO,
            meal: None,
            date: None,
            note: None,
        };
        assert!(quick_add_entry(zero, date!(2024 - 02 - 01), MealType::Lunch).is_err());
    }

    #[test]
    fn update_recomputes_from_food() {
        let food = oats();
        let entry = logged(&food, 50.0);
        let req = UpdateEntryRequest {
            amount: Some(100.0),
            note: Some("big bowl".into()),
            ..Default::default()
        };
        let c = resolve_changes(&entry, Some(&food), req, MassUnit::G).unwrap();
        assert_eq!(c.amount_grams, 100.0);
        assert_eq!(c.macros, Macros::new(389.0, 16.9, 66.3, 6.9));
        assert_eq!(c.note.as_deref(), Some("big bowl"));
        assert_eq!(c.meal, MealType::Breakfast);
    }

    #[test]
    fn update_scales_when_food_is_gone() {
        let mut entry = logged(&oats(), 50.0);
        entry.food_id = None;
        let req = UpdateEntryRequest {
            amount: Some(100.0),
            ..Default::default()
        };
        let c = resolve_changes(&entry, None, req, MassUnit::G).unwrap();
        assert_eq!(c.macros.calories, 390.0);
    }

    #[test]
    fn update_rules_for_recipes_and_macros() {
        let food = oats();
        let mut recipe = logged(&food, 50.0);
        recipe.is_recipe = true;
        recipe.food_id = None;
        let req = UpdateEntryRequest {
            amount: Some(10.0),
            ..Default::default()
        };
        assert!(resolve_changes(&recipe, None, req, MassUnit::G).is_err());

        let linked = logged(&food, 50.0);
        let req = UpdateEntryRequest {
            macros: Some(Macros::new(100.0, 1.0, 1.0, 1.0)),
            ..Default::default()
        };
        assert!(resolve_changes(&linked, Some(&food), req, MassUnit::G).is_err());

        let mut child = logged(&food, 50.0);
        child.parent_entry_id = Some(Uuid::new_v4());
        let req = UpdateEntryRequest {
            meal: Some(MealType::Dinner),
            ..Default::default()
        };
        assert!(resolve_changes(&child, Some(&food), req, MassUnit::G).is_err());
    }

    #[test]
    fn quick_add_entries_take_direct_macros() {
        let req = QuickAddRequest {
            name: Some("Bar".into()),
            macros: Macros::new(200.0, 10.0, 20.0, 8.0),
            meal: None,
            date: None,
            note: Some("post run".into()),
        };
        let e = quick_add_entry(req, date!(2024 - 02 - 01), MealType::Snacks).unwrap();
        let entry = Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: e.date,
            meal: e.meal,
            food_id: None,
            food_name: e.food_name,
            amount_grams: 0.0,
            macros: e.macros,
            note: e.note,
            parent_entry_id: None,
            is_recipe: false,
            created_at: datetime!(2024-02-01 16:00 UTC),
        };
        let req = UpdateEntryRequest {
            macros: Some(Macros::new(220.0, 12.0, 20.0, 8.0)),
            note: Some(String::new()),
            ..Default::default()
        };
        let c = resolve_changes(&entry, None, req, MassUnit::G).unwrap();
        assert_eq!(c.macros.calories, 220.0);
        assert_eq!(c.note, None);
    }
}
