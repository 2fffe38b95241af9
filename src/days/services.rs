use serde::Serialize;
use time::Date;

use crate::entries::{build_tree, top_level_totals, Entry, EntryNode};
use crate::nutrition::{targets::day_status, DayStatus, Macros, MealType, Tolerance};
use crate::settings::UserSettings;

#[derive(Debug, Serialize)]
pub struct MealSummary {
    pub meal: MealType,
    pub name: String,
    pub totals: Macros,
    pub entries: Vec<EntryNode>,
}

/// Everything the dashboard shows for one date.
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: Date,
    pub targets: Macros,
    pub consumed: Macros,
    pub remaining: Macros,
    pub tolerance: Tolerance,
    pub status: DayStatus,
    pub meals: Vec<MealSummary>,
}

/// Splits a day's entries into the four meals, in display order.
///
/// Only top-level rows count toward totals. A recipe child sits under its
/// recipe's meal even if its own row says otherwise.
pub fn summarize_day(date: Date, entries: Vec<Entry>, settings: &UserSettings) -> DaySummary {
    let tree = build_tree(entries);
    let consumed = top_level_totals(&tree);

    let mut meals: Vec<MealSummary> = MealType::ORDER
        .iter()
        .map(|&meal| MealSummary {
            meal,
            name: settings.meal_names.get(meal).to_string(),
            totals: Macros::ZERO,
            entries: Vec::new(),
        })
        .collect();

    for node in tree {
        if let Some(slot) = meals.iter_mut().find(|m| m.meal == node.entry.meal) {
            slot.entries.push(node);
        }
    }
    for slot in meals.iter_mut() {
        slot.totals = top_level_totals(&slot.entries);
    }

    let targets = settings.daily_targets;
    DaySummary {
        date,
        targets,
        consumed,
        remaining: (targets - consumed).rounded(),
        tolerance: settings.tolerance,
        status: day_status(&consumed, &targets, &settings.tolerance),
        meals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn entry(meal: MealType, macros: Macros) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date!(2024 - 06 - 10),
            meal,
            food_id: None,
            food_name: "x".into(),
            amount_grams: 100.0,
            macros,
            note: None,
            parent_entry_id: None,
            is_recipe: false,
            created_at: datetime!(2024-06-10 9:00 UTC),
        }
    }

    #[test]
    fn empty_day_has_all_meals_and_full_remaining() {
        let s = summarize_day(date!(2024 - 06 - 10), Vec::new(), &UserSettings::default());
        assert_eq!(s.meals.len(), 4);
        assert_eq!(s.meals[0].name, "Breakfast");
        assert_eq!(s.consumed, Macros::ZERO);
        assert_eq!(s.remaining, s.targets);
        assert_eq!(s.status, DayStatus::Empty);
    }

    #[test]
    fn totals_skip_recipe_children() {
        let mut recipe = entry(MealType::Lunch, Macros::new(600.0, 40.0, 60.0, 20.0));
        recipe.is_recipe = true;
        let mut a = entry(MealType::Lunch, Macros::new(400.0, 30.0, 40.0, 10.0));
        let mut b = entry(MealType::Lunch, Macros::new(200.0, 10.0, 20.0, 10.0));
        a.parent_entry_id = Some(recipe.id);
        b.parent_entry_id = Some(recipe.id);
        let snack = entry(MealType::Snacks, Macros::new(100.0, 5.0, 10.0, 2.0));

        let s = summarize_day(
            date!(2024 - 06 - 10),
            vec![recipe, a, b, snack],
            &UserSettings::default(),
        );
        assert_eq!(s.consumed.calories, 700.0);
        assert_eq!(s.remaining.calories, 1300.0);

        let lunch = &s.meals[1];
        assert_eq!(lunch.meal, MealType::Lunch);
        assert_eq!(lunch.totals.calories, 600.0);
        assert_eq!(lunch.entries.len(), 1);
        assert_eq!(lunch.entries[0].children.len(), 2);
        assert_eq!(s.meals[3].totals.calories, 100.0);
        assert_eq!(s.status, DayStatus::Under);
    }

    #[test]
    fn custom_meal_names_are_used() {
        let mut settings = UserSettings::default();
        settings.meal_names.snacks = "Grazing".into();
        let s = summarize_day(date!(2024 - 06 - 10), Vec::new(), &settings);
        assert_eq!(s.meals[3].name, "Grazing");
    }
}
