use std::collections::HashSet;

use time::Date;
use uuid::Uuid;

use super::dto::CreateTemplateRequest;
use super::repo_types::{MealTemplate, NewTemplate, TemplateEntry};
use crate::entries::{Entry, NewEntry};
use crate::error::ApiError;
use crate::nutrition::macros::round1;

/// Snapshot of logged entries as template lines. A child whose recipe is
/// also selected is already covered by the recipe line.
pub fn snapshot(entries: &[Entry]) -> Vec<TemplateEntry> {
    let selected: HashSet<Uuid> = entries.iter().map(|e| e.id).collect();
    entries
        .iter()
        .filter(|e| !e.parent_entry_id.is_some_and(|p| selected.contains(&p)))
        .map(|e| TemplateEntry {
            food_id: e.food_id,
            food_name: e.food_name.clone(),
            amount_grams: e.amount_grams,
            macros: e.macros,
        })
        .collect()
}

fn check_line(line: TemplateEntry) -> Result<TemplateEntry, ApiError> {
    let food_name = line.food_name.trim().to_string();
    if food_name.is_empty() {
        return Err(ApiError::Validation("Every template entry needs a name".into()));
    }
    if !line.amount_grams.is_finite() || line.amount_grams < 0.0 {
        return Err(ApiError::Validation("Template amounts must be zero or more".into()));
    }
    if !line.macros.all_finite() || line.macros.any_negative() {
        return Err(ApiError::Validation(
            "Template macros must be zero or more".into(),
        ));
    }
    Ok(TemplateEntry {
        food_id: line.food_id,
        food_name,
        amount_grams: round1(line.amount_grams),
        macros: line.macros.rounded(),
    })
}

/// Builds a template from a create request. `logged` holds the entries the
/// request's `entry_ids` resolved to; every id must have resolved.
pub fn new_template(req: CreateTemplateRequest, logged: &[Entry]) -> Result<NewTemplate, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Template name is required".into()));
    }
    let found: HashSet<Uuid> = logged.iter().map(|e| e.id).collect();
    if req.entry_ids.iter().any(|id| !found.contains(id)) {
        return Err(ApiError::NotFound("entry"));
    }

    let (lines, fallback_meal) = if req.entry_ids.is_empty() {
        (req.entries, None)
    } else {
        (snapshot(logged), logged.first().map(|e| e.meal))
    };
    if lines.is_empty() {
        return Err(ApiError::Validation("A template needs at least one entry".into()));
    }
    let entries = lines.into_iter().map(check_line).collect::<Result<Vec<_>, _>>()?;

    let meal_type = req
        .meal_type
        .or(fallback_meal)
        .ok_or_else(|| ApiError::Validation("meal_type is required".into()))?;

    Ok(NewTemplate {
        name,
        meal_type,
        entries,
    })
}

/// Entries to log when applying a template. Links to foods the user no
/// longer has are dropped; the denormalised name and macros remain.
pub fn plan_apply(template: &MealTemplate, date: Date, known_foods: &HashSet<Uuid>) -> Vec<NewEntry> {
    template
        .entries
        .iter()
        .map(|line| NewEntry {
            date,
            meal: template.meal_type,
            food_id: line.food_id.filter(|id| known_foods.contains(id)),
            food_name: line.food_name.clone(),
            amount_grams: line.amount_grams,
            macros: line.macros,
            note: None,
            parent_entry_id: None,
            is_recipe: false,
        })
        .collect()
}

pub fn linked_food_ids(template: &MealTemplate) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = template.entries.iter().filter_map(|e| e.food_id).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{Macros, MealType};
    use time::macros::{date, datetime};

    fn logged(name: &str, food: Option<Uuid>, meal: MealType) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date!(2024 - 04 - 02),
            meal,
            food_id: food,
            food_name: name.into(),
            amount_grams: 120.0,
            macros: Macros::new(180.0, 12.0, 20.0, 4.0),
            note: Some("ignored".into()),
            parent_entry_id: None,
            is_recipe: false,
            created_at: datetime!(2024-04-02 7:30 UTC),
        }
    }

    fn template(entries: Vec<TemplateEntry>) -> MealTemplate {
        MealTemplate {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Usual breakfast".into(),
            meal_type: MealType::Breakfast,
            entries,
            totals: Macros::ZERO,
            use_count: 0,
            last_used_at: None,
            created_at: datetime!(2024-04-01 0:00 UTC),
        }
    }

    #[test]
    fn from_entry_ids_snapshots_and_takes_meal() {
        let yogurt = logged("Yogurt", Some(Uuid::new_v4()), MealType::Breakfast);
        let req = CreateTemplateRequest {
            name: "Usual".into(),
            meal_type: None,
            entry_ids: vec![yogurt.id],
            entries: Vec::new(),
        };
        let t = new_template(req, &[yogurt.clone()]).unwrap();
        assert_eq!(t.meal_type, MealType::Breakfast);
        assert_eq!(t.entries.len(), 1);
        assert_eq!(t.entries[0].food_id, yogurt.food_id);
        assert_eq!(t.entries[0].amount_grams, 120.0);
    }

    #[test]
    fn every_requested_entry_must_resolve() {
        let yogurt = logged("Yogurt", None, MealType::Breakfast);
        let req = CreateTemplateRequest {
            name: "Usual".into(),
            meal_type: None,
            entry_ids: vec![yogurt.id, Uuid::new_v4()],
            entries: Vec::new(),
        };
        assert!(matches!(
            new_template(req, &[yogurt.clone()]),
            Err(ApiError::NotFound("entry"))
        ));

        // repeated ids are fine as long as each one resolved
        let req = CreateTemplateRequest {
            name: "Usual".into(),
            meal_type: None,
            entry_ids: vec![yogurt.id, yogurt.id],
            entries: Vec::new(),
        };
        assert_eq!(new_template(req, &[yogurt]).unwrap().entries.len(), 1);
    }

    #[test]
    fn snapshot_skips_children_of_selected_recipes() {
        let mut recipe = logged("Smoothie", None, MealType::Snacks);
        recipe.is_recipe = true;
        let mut child = logged("Banana", None, MealType::Snacks);
        child.parent_entry_id = Some(recipe.id);
        let lone_child = {
            let mut c = logged("Milk", None, MealType::Snacks);
            c.parent_entry_id = Some(Uuid::new_v4());
            c
        };
        let lines = snapshot(&[recipe, child, lone_child]);
        let names: Vec<&str> = lines.iter().map(|l| l.food_name.as_str()).collect();
        assert_eq!(names, vec!["Smoothie", "Milk"]);
    }

    #[test]
    fn explicit_entries_need_a_meal_and_valid_lines() {
        let line = TemplateEntry {
            food_id: None,
            food_name: " Toast ".into(),
            amount_grams: 60.0,
            macros: Macros::new(160.0, 5.0, 30.0, 2.0),
        };
        let req = CreateTemplateRequest {
            name: "Toast".into(),
            meal_type: None,
            entry_ids: Vec::new(),
            entries: vec![line.clone()],
        };
        assert!(new_template(req, &[]).is_err());

        let req = CreateTemplateRequest {
            name: "Toast".into(),
            meal_type: Some(MealType::Breakfast),
            entry_ids: Vec::new(),
            entries: vec![line.clone()],
        };
        assert_eq!(new_template(req, &[]).unwrap().entries[0].food_name, "Toast");

        let bad = TemplateEntry {
            amount_grams: -1.0,
            ..line
        };
        let req = CreateTemplateRequest {
            name: "Toast".into(),
            meal_type: Some(MealType::Breakfast),
            entry_ids: Vec::new(),
            entries: vec![bad],
        };
        assert!(new_template(req, &[]).is_err());
    }

    #[test]
    fn empty_templates_are_rejected() {
        let req = CreateTemplateRequest {
            name: "Nothing".into(),
            meal_type: Some(MealType::Lunch),
            entry_ids: Vec::new(),
            entries: Vec::new(),
        };
        assert!(new_template(req, &[]).is_err());
    }

    #[test]
    fn apply_uses_template_meal_and_drops_missing_foods() {
        let kept = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let line = |id| TemplateEntry {
            food_id: Some(id),
            food_name: "Eggs".into(),
            amount_grams: 100.0,
            macros: Macros::new(143.0, 12.6, 0.7, 9.5),
        };
        let t = template(vec![line(kept), line(gone)]);
        assert_eq!(linked_food_ids(&t).len(), 2);

        let known: HashSet<Uuid> = [kept].into_iter().collect();
        let planned = plan_apply(&t, date!(2024 - 04 - 09), &known);
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|e| e.meal == MealType::Breakfast));
        assert!(planned.iter().all(|e| e.date == date!(2024 - 04 - 09)));
        assert_eq!(planned[0].food_id, Some(kept));
        assert_eq!(planned[1].food_id, None);
        assert_eq!(planned[1].food_name, "Eggs");
    }
}
