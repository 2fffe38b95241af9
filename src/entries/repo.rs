use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use time::Date;
use uuid::Uuid;

use super::recipes::GroupPlan;
use super::repo_types::{Entry, EntryChanges, EntryRow, NewEntry};
use crate::nutrition::MealType;

const SELECT_ENTRY: &str = r#"
    SELECT id, user_id, date, meal, food_id, food_name, amount_grams,
           calories, protein, carbs, fat, note, parent_entry_id, is_recipe, created_at
    FROM entries
"#;

const RETURNING_ENTRY: &str = r#"
    RETURNING id, user_id, date, meal, food_id, food_name, amount_grams,
              calories, protein, carbs, fat, note, parent_entry_id, is_recipe, created_at
"#;

/// Entries for one day in logging order, optionally limited to one meal.
/// Children of a recipe in that meal are included.
pub async fn list_for_date(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    meal: Option<MealType>,
) -> anyhow::Result<Vec<Entry>> {
    let sql = format!(
        "{SELECT_ENTRY} WHERE user_id = $1 AND date = $2 AND ($3::meal_type IS NULL OR meal = $3)
         ORDER BY created_at ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(date)
        .bind(meal)
        .fetch_all(db)
        .await
        .context("list entries for date")?;
    Ok(rows.into_iter().map(Entry::from).collect())
}

/// Entries between `start` and `end`, both inclusive.
pub async fn list_between(db: &PgPool, user_id: Uuid, start: Date, end: Date) -> anyhow::Result<Vec<Entry>> {
    let sql = format!(
        "{SELECT_ENTRY} WHERE user_id = $1 AND date BETWEEN $2 AND $3
         ORDER BY date ASC, created_at ASC"
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
        .context("list entries between dates")?;
    Ok(rows.into_iter().map(Entry::from).collect())
}

/// Distinct dates with at least one entry, newest first.
pub async fn logged_dates(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<Date>> {
    let dates: Vec<(Date,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT date FROM entries
         WHERE user_id = $1
         ORDER BY date DESC
         LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("list logged dates")?;
    Ok(dates.into_iter().map(|(d,)| d).collect())
}

pub async fn get<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Entry>> {
    let sql = format!("{SELECT_ENTRY} WHERE id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get entry")?;
    Ok(row.map(Entry::from))
}

/// The requested entries that exist, in the order the ids were given.
pub async fn get_many<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Entry>> {
    let sql = format!("{SELECT_ENTRY} WHERE user_id = $1 AND id = ANY($2)");
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await
        .context("get entries")?;
    let mut entries: Vec<Entry> = rows.into_iter().map(Entry::from).collect();
    entries.sort_by_key(|e| ids.iter().position(|id| *id == e.id));
    Ok(entries)
}

pub async fn children_of<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, parent_id: Uuid) -> anyhow::Result<Vec<Entry>> {
    let sql = format!(
        "{SELECT_ENTRY} WHERE user_id = $1 AND parent_entry_id = $2 ORDER BY created_at ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(db)
        .await
        .context("list recipe children")?;
    Ok(rows.into_iter().map(Entry::from).collect())
}

pub async fn insert<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, e: &NewEntry) -> anyhow::Result<Entry> {
    let sql = format!(
        r#"INSERT INTO entries (
               user_id, date, meal, food_id, food_name, amount_grams,
               calories, protein, carbs, fat, note, parent_entry_id, is_recipe)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
           {RETURNING_ENTRY}"#
    );
    let row = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(e.date)
        .bind(e.meal)
        .bind(e.food_id)
        .bind(&e.food_name)
        .bind(e.amount_grams)
        .bind(e.macros.calories)
        .bind(e.macros.protein)
        .bind(e.macros.carbs)
        .bind(e.macros.fat)
        .bind(&e.note)
        .bind(e.parent_entry_id)
        .bind(e.is_recipe)
        .fetch_one(db)
        .await
        .context("insert entry")?;
    Ok(row.into())
}

/// Writes the changes to one entry. A recipe's children follow it to its
/// new meal.
pub async fn update(db: &PgPool, user_id: Uuid, id: Uuid, c: &EntryChanges) -> anyhow::Result<Option<Entry>> {
    let mut tx = db.begin().await.context("begin update entry")?;

    let sql = format!(
        r#"UPDATE entries SET
               meal = $3, amount_grams = $4, calories = $5, protein = $6,
               carbs = $7, fat = $8, note = $9
           WHERE id = $1 AND user_id = $2
           {RETURNING_ENTRY}"#
    );
    let row = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(c.meal)
        .bind(c.amount_grams)
        .bind(c.macros.calories)
        .bind(c.macros.protein)
        .bind(c.macros.carbs)
        .bind(c.macros.fat)
        .bind(&c.note)
        .fetch_optional(&mut *tx)
        .await
        .context("update entry")?;

    let Some(row) = row else {
        return Ok(None);
    };
    if row.is_recipe {
        sqlx::query("UPDATE entries SET meal = $3 WHERE user_id = $1 AND parent_entry_id = $2")
            .bind(user_id)
            .bind(id)
            .bind(c.meal)
            .execute(&mut *tx)
            .await
            .context("move recipe children")?;
    }

    tx.commit().await.context("commit update entry")?;
    Ok(Some(row.into()))
}

/// Deletes an entry. Recipe children go with it through the foreign key.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete entry")?;
    Ok(res.rows_affected() > 0)
}

/// Inserts the recipe row and moves its children under it, all or nothing.
/// `None` when a child was grouped or removed by someone else meanwhile.
pub async fn create_recipe(
    db: &PgPool,
    user_id: Uuid,
    plan: &GroupPlan,
) -> anyhow::Result<Option<(Entry, Vec<Entry>)>> {
    let mut tx = db.begin().await.context("begin create recipe")?;

    let recipe = insert(&mut *tx, user_id, &plan.recipe).await?;

    let sql = format!(
        "UPDATE entries SET parent_entry_id = $3, meal = $4
         WHERE user_id = $1 AND id = ANY($2) AND parent_entry_id IS NULL AND NOT is_recipe
         {RETURNING_ENTRY}"
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(&plan.child_ids)
        .bind(recipe.id)
        .bind(recipe.meal)
        .fetch_all(&mut *tx)
        .await
        .context("attach recipe children")?;

    if rows.len() != plan.child_ids.len() {
        return Ok(None);
    }

    tx.commit().await.context("commit create recipe")?;
    Ok(Some((recipe, rows.into_iter().map(Entry::from).collect())))
}

/// Releases the children and removes the recipe row.
pub async fn dissolve_recipe(
    db: &PgPool,
    user_id: Uuid,
    recipe_id: Uuid,
    child_ids: &[Uuid],
) -> anyhow::Result<Vec<Entry>> {
    let mut tx = db.begin().await.context("begin ungroup recipe")?;

    let sql = format!(
        "UPDATE entries SET parent_entry_id = NULL
         WHERE user_id = $1 AND id = ANY($2) AND parent_entry_id = $3
         {RETURNING_ENTRY}"
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(user_id)
        .bind(child_ids)
        .bind(recipe_id)
        .fetch_all(&mut *tx)
        .await
        .context("release recipe children")?;

    sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2 AND is_recipe")
        .bind(recipe_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("delete recipe")?;

    tx.commit().await.context("commit ungroup recipe")?;
    Ok(rows.into_iter().map(Entry::from).collect())
}

/// Copies an entry, and for recipes its children, in one transaction.
/// The copy is always top-level.
pub async fn duplicate(db: &PgPool, user_id: Uuid, source: &Entry, children: &[Entry]) -> anyhow::Result<Entry> {
    let mut tx = db.begin().await.context("begin duplicate entry")?;

    let copy = insert(&mut *tx, user_id, &NewEntry::copy_of(source, None)).await?;
    for child in children {
        insert(&mut *tx, user_id, &NewEntry::copy_of(child, Some(copy.id))).await?;
    }

    tx.commit().await.context("commit duplicate entry")?;
    Ok(copy)
}
