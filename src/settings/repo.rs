use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::{SettingsRow, UserSettings};
use crate::nutrition::MealType;

const SETTINGS_COLUMNS: &str = r#"
    preferred_unit, daily_calories, daily_protein, daily_carbs, daily_fat,
    training_calories, training_protein, training_carbs, training_fat,
    rest_calories, rest_protein, rest_carbs, rest_fat,
    tolerance_macros, tolerance_calories,
    meal_name_breakfast, meal_name_lunch, meal_name_dinner, meal_name_snacks,
    last_meal
"#;

/// Saved settings, or defaults for a user who never changed anything.
pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<UserSettings> {
    let sql = format!("SELECT {SETTINGS_COLUMNS} FROM user_settings WHERE user_id = $1");
    let row = sqlx::query_as::<_, SettingsRow>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get settings")?;
    Ok(row.map(UserSettings::from).unwrap_or_default())
}

pub async fn save(db: &PgPool, user_id: Uuid, s: &UserSettings) -> anyhow::Result<UserSettings> {
    let training = s.training_day;
    let rest = s.rest_day;
    let sql = format!(
        r#"INSERT INTO user_settings (user_id, {SETTINGS_COLUMNS})
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                   $15, $16, $17, $18, $19, $20, $21)
           ON CONFLICT (user_id) DO UPDATE SET
               preferred_unit = EXCLUDED.preferred_unit,
               daily_calories = EXCLUDED.daily_calories,
               daily_protein = EXCLUDED.daily_protein,
               daily_carbs = EXCLUDED.daily_carbs,
               daily_fat = EXCLUDED.daily_fat,
               training_calories = EXCLUDED.training_calories,
               training_protein = EXCLUDED.training_protein,
               training_carbs = EXCLUDED.training_carbs,
               training_fat = EXCLUDED.training_fat,
               rest_calories = EXCLUDED.rest_calories,
               rest_protein = EXCLUDED.rest_protein,
               rest_carbs = EXCLUDED.rest_carbs,
               rest_fat = EXCLUDED.rest_fat,
               tolerance_macros = EXCLUDED.tolerance_macros,
               tolerance_calories = EXCLUDED.tolerance_calories,
               meal_name_breakfast = EXCLUDED.meal_name_breakfast,
               meal_name_lunch = EXCLUDED.meal_name_lunch,
               meal_name_dinner = EXCLUDED.meal_name_dinner,
               meal_name_snacks = EXCLUDED.meal_name_snacks,
               last_meal = EXCLUDED.last_meal,
               updated_at = now()
           RETURNING {SETTINGS_COLUMNS}"#
    );
    let row = sqlx::query_as::<_, SettingsRow>(&sql)
        .bind(user_id)
        .bind(s.preferred_unit)
        .bind(s.daily_targets.calories)
        .bind(s.daily_targets.protein)
        .bind(s.daily_targets.carbs)
        .bind(s.daily_targets.fat)
        .bind(training.map(|m| m.calories))
        .bind(training.map(|m| m.protein))
        .bind(training.map(|m| m.carbs))
        .bind(training.map(|m| m.fat))
        .bind(rest.map(|m| m.calories))
        .bind(rest.map(|m| m.protein))
        .bind(rest.map(|m| m.carbs))
        .bind(rest.map(|m| m.fat))
        .bind(s.tolerance.macros)
        .bind(s.tolerance.calories)
        .bind(&s.meal_names.breakfast)
        .bind(&s.meal_names.lunch)
        .bind(&s.meal_names.dinner)
        .bind(&s.meal_names.snacks)
        .bind(s.last_meal)
        .fetch_one(db)
        .await
        .context("save settings")?;
    Ok(row.into())
}

pub async fn last_meal<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid) -> anyhow::Result<Option<MealType>> {
    let meal: Option<Option<MealType>> =
        sqlx::query_scalar("SELECT last_meal FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("get last meal")?;
    Ok(meal.flatten())
}

/// Records the meal most recently logged to, creating the settings row
/// when needed.
pub async fn remember_last_meal<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, meal: MealType) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_settings (user_id, last_meal) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET last_meal = EXCLUDED.last_meal, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(meal)
    .execute(db)
    .await
    .context("remember last meal")?;
    Ok(())
}
