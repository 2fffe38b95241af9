use anyhow::Context;
use sqlx::{types::Json, PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::{MealTemplate, NewTemplate, TemplateRow};
use crate::nutrition::MealType;

const TEMPLATE_COLUMNS: &str =
    "id, user_id, name, meal_type, entries, use_count, last_used_at, created_at";

/// Most used first, optionally for one meal.
pub async fn list(db: &PgPool, user_id: Uuid, meal: Option<MealType>) -> anyhow::Result<Vec<MealTemplate>> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM meal_templates
         WHERE user_id = $1 AND ($2::meal_type IS NULL OR meal_type = $2)
         ORDER BY use_count DESC, lower(name) ASC"
    );
    let rows = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(user_id)
        .bind(meal)
        .fetch_all(db)
        .await
        .context("list templates")?;
    Ok(rows.into_iter().map(MealTemplate::from).collect())
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealTemplate>> {
    let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM meal_templates WHERE id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get template")?;
    Ok(row.map(MealTemplate::from))
}

pub async fn insert(db: &PgPool, user_id: Uuid, t: &NewTemplate) -> anyhow::Result<MealTemplate> {
    let sql = format!(
        "INSERT INTO meal_templates (user_id, name, meal_type, entries)
         VALUES ($1, $2, $3, $4)
         RETURNING {TEMPLATE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(user_id)
        .bind(&t.name)
        .bind(t.meal_type)
        .bind(Json(&t.entries))
        .fetch_one(db)
        .await
        .context("insert template")?;
    Ok(row.into())
}

pub async fn mark_used<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealTemplate>> {
    let sql = format!(
        "UPDATE meal_templates
            SET use_count = use_count + 1, last_used_at = now(), updated_at = now()
          WHERE id = $1 AND user_id = $2
         RETURNING {TEMPLATE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("mark template used")?;
    Ok(row.map(MealTemplate::from))
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_templates WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete template")?;
    Ok(res.rows_affected() > 0)
}
