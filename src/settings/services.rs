use super::dto::{DayTemplate, MealNamesPatch, SettingsPatch};
use super::repo_types::{UserSettings, DEFAULT_TARGETS};
use crate::error::ApiError;
use crate::nutrition::{Macros, MealType};

fn check_targets(label: &str, m: &Macros) -> Result<(), ApiError> {
    if !m.all_finite() || m.any_negative() {
        return Err(ApiError::Validation(format!(
            "{label} must be zero or more"
        )));
    }
    Ok(())
}

fn rename_meals(settings: &mut UserSettings, names: MealNamesPatch) {
    let changes = [
        (MealType::Breakfast, names.breakfast),
        (MealType::Lunch, names.lunch),
        (MealType::Dinner, names.dinner),
        (MealType::Snacks, names.snacks),
    ];
    for (meal, name) in changes {
        let Some(name) = name else { continue };
        let name = name.trim();
        *settings.meal_names.get_mut(meal) = if name.is_empty() {
            meal.default_label().to_string()
        } else {
            name.to_string()
        };
    }
}

pub fn apply_patch(mut settings: UserSettings, patch: SettingsPatch) -> Result<UserSettings, ApiError> {
    if let Some(unit) = patch.preferred_unit {
        settings.preferred_unit = unit;
    }
    if let Some(targets) = patch.daily_targets {
        check_targets("Daily targets", &targets)?;
        settings.daily_targets = targets;
    }
    if let Some(training) = patch.training_day {
        if let Some(t) = &training {
            check_targets("Training day targets", t)?;
        }
        settings.training_day = training;
    }
    if let Some(rest) = patch.rest_day {
        if let Some(r) = &rest {
            check_targets("Rest day targets", r)?;
        }
        settings.rest_day = rest;
    }
    if let Some(tolerance) = patch.tolerance {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(tolerance.macros) || !ok(tolerance.calories) {
            return Err(ApiError::Validation("Tolerance must be zero or more".into()));
        }
        settings.tolerance = tolerance;
    }
    if let Some(names) = patch.meal_names {
        rename_meals(&mut settings, names);
    }
    if let Some(meal) = patch.last_meal {
        settings.last_meal = Some(meal);
    }
    Ok(settings)
}

pub fn reset_targets(mut settings: UserSettings) -> UserSettings {
    settings.daily_targets = DEFAULT_TARGETS;
    settings
}

/// Copies the training or rest day targets into the daily targets.
pub fn apply_day_template(mut settings: UserSettings, template: DayTemplate) -> Result<UserSettings, ApiError> {
    let (targets, label) = match template {
        DayTemplate::Training => (settings.training_day, "training"),
        DayTemplate::Rest => (settings.rest_day, "rest"),
    };
    let targets =
        targets.ok_or_else(|| ApiError::Validation(format!("No {label} day targets saved")))?;
    settings.daily_targets = targets;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Tolerance;

    #[test]
    fn defaults() {
        let s = UserSettings::default();
        assert_eq!(s.daily_targets, Macros::new(2000.0, 150.0, 200.0, 65.0));
        assert_eq!(s.tolerance, Tolerance { macros: 5.0, calories: 50.0 });
        assert_eq!(s.meal_names.get(MealType::Snacks), "Snacks");
    }

    #[test]
    fn patch_changes_only_given_fields() {
        let patch = SettingsPatch {
            daily_targets: Some(Macros::new(2500.0, 180.0, 250.0, 70.0)),
            meal_names: Some(MealNamesPatch {
                lunch: Some("  Second breakfast ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let s = apply_patch(UserSettings::default(), patch).unwrap();
        assert_eq!(s.daily_targets.calories, 2500.0);
        assert_eq!(s.meal_names.lunch, "Second breakfast");
        assert_eq!(s.meal_names.breakfast, "Breakfast");
        assert_eq!(s.tolerance, Tolerance::default());
    }

    #[test]
    fn blank_meal_name_restores_default() {
        let mut s = UserSettings::default();
        s.meal_names.dinner = "Supper".into();
        let patch = SettingsPatch {
            meal_names: Some(MealNamesPatch {
                dinner: Some("".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(apply_patch(s, patch).unwrap().meal_names.dinner, "Dinner");
    }

    #[test]
    fn patch_rejects_negative_values() {
        let patch = SettingsPatch {
            daily_targets: Some(Macros::new(-1.0, 0.0, 0.0, 0.0)),
            ..Default::default()
        };
        assert!(apply_patch(UserSettings::default(), patch).is_err());

        let patch = SettingsPatch {
            tolerance: Some(Tolerance { macros: -2.0, calories: 10.0 }),
            ..Default::default()
        };
        assert!(apply_patch(UserSettings::default(), patch).is_err());
    }

    #[test]
    fn null_clears_day_targets_and_absence_keeps_them() {
        let mut s = UserSettings::default();
        s.training_day = Some(Macros::new(2600.0, 180.0, 300.0, 70.0));
        s.rest_day = Some(Macros::new(1800.0, 140.0, 150.0, 60.0));

        let keep: SettingsPatch = serde_json::from_str(r#"{"preferred_unit":"oz"}"#).unwrap();
        let kept = apply_patch(s.clone(), keep).unwrap();
        assert!(kept.training_day.is_some());
        assert!(kept.rest_day.is_some());

        let clear: SettingsPatch = serde_json::from_str(r#"{"training_day":null}"#).unwrap();
        let cleared = apply_patch(s, clear).unwrap();
        assert_eq!(cleared.training_day, None);
        assert!(cleared.rest_day.is_some());
    }

    #[test]
    fn reset_and_day_templates() {
        let mut s = UserSettings::default();
        s.daily_targets = Macros::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(reset_targets(s.clone()).daily_targets, DEFAULT_TARGETS);

        assert!(apply_day_template(s.clone(), DayTemplate::Training).is_err());

        s.rest_day = Some(Macros::new(1800.0, 140.0, 150.0, 60.0));
        let applied = apply_day_template(s, DayTemplate::Rest).unwrap();
        assert_eq!(applied.daily_targets.calories, 1800.0);
    }
}
