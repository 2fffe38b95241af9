use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::{Food, FoodRow, NewFood};

const SELECT_FOOD: &str = r#"
    SELECT id, user_id, name, brand, barcode, nutrition_basis,
           calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g,
           calories_per_serving, protein_per_serving, carbs_per_serving, fat_per_serving,
           serving_grams, serving_label, source, is_favorite, use_count,
           last_used_at, created_at, updated_at
    FROM foods
"#;

const RETURNING_FOOD: &str = r#"
    RETURNING id, user_id, name, brand, barcode, nutrition_basis,
              calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g,
              calories_per_serving, protein_per_serving, carbs_per_serving, fat_per_serving,
              serving_grams, serving_label, source, is_favorite, use_count,
              last_used_at, created_at, updated_at
"#;

async fn fetch_many(db: &PgPool, sql: &str, user_id: Uuid, limit: Option<i64>) -> anyhow::Result<Vec<Food>> {
    let mut q = sqlx::query_as::<_, FoodRow>(sql).bind(user_id);
    if let Some(limit) = limit {
        q = q.bind(limit);
    }
    let rows = q.fetch_all(db).await?;
    Ok(rows.into_iter().map(Food::from).collect())
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
    let sql = format!("{SELECT_FOOD} WHERE user_id = $1 ORDER BY lower(name) ASC");
    fetch_many(db, &sql, user_id, None).await.context("list foods")
}

/// Case-insensitive substring match on name or brand.
pub async fn search(db: &PgPool, user_id: Uuid, pattern: &str, limit: i64) -> anyhow::Result<Vec<Food>> {
    let sql = format!(
        "{SELECT_FOOD} WHERE user_id = $1 AND (name ILIKE $2 ESCAPE '\\' OR brand ILIKE $2 ESCAPE '\\')
         ORDER BY use_count DESC, lower(name) ASC LIMIT $3"
    );
    let rows = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("search foods")?;
    Ok(rows.into_iter().map(Food::from).collect())
}

pub async fn recent(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<Food>> {
    let sql = format!(
        "{SELECT_FOOD} WHERE user_id = $1 AND last_used_at IS NOT NULL
         ORDER BY last_used_at DESC LIMIT $2"
    );
    fetch_many(db, &sql, user_id, Some(limit)).await.context("recent foods")
}

pub async fn frequent(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<Food>> {
    let sql = format!("{SELECT_FOOD} WHERE user_id = $1 ORDER BY use_count DESC LIMIT $2");
    fetch_many(db, &sql, user_id, Some(limit)).await.context("frequent foods")
}

pub async fn favorites(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
    let sql = format!("{SELECT_FOOD} WHERE user_id = $1 AND is_favorite ORDER BY lower(name) ASC");
    fetch_many(db, &sql, user_id, None).await.context("favorite foods")
}

pub async fn find_by_barcode(db: &PgPool, user_id: Uuid, barcode: &str) -> anyhow::Result<Option<Food>> {
    let sql = format!("{SELECT_FOOD} WHERE user_id = $1 AND barcode = $2 ORDER BY updated_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(user_id)
        .bind(barcode)
        .fetch_optional(db)
        .await
        .context("find food by barcode")?;
    Ok(row.map(Food::from))
}

pub async fn get<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Food>> {
    let sql = format!("{SELECT_FOOD} WHERE id = $1 AND user_id = $2");
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get food")?;
    Ok(row.map(Food::from))
}

pub async fn insert(db: &PgPool, user_id: Uuid, f: &NewFood) -> anyhow::Result<Food> {
    let per_100g = f.macros_per_100g;
    let per_serving = f.macros_per_serving;
    let sql = format!(
        r#"INSERT INTO foods (
               user_id, name, brand, barcode, nutrition_basis,
               calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g,
               calories_per_serving, protein_per_serving, carbs_per_serving, fat_per_serving,
               serving_grams, serving_label, source, is_favorite)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
           {RETURNING_FOOD}"#
    );
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(user_id)
        .bind(&f.name)
        .bind(&f.brand)
        .bind(&f.barcode)
        .bind(f.nutrition_basis)
        .bind(per_100g.map(|m| m.calories))
        .bind(per_100g.map(|m| m.protein))
        .bind(per_100g.map(|m| m.carbs))
        .bind(per_100g.map(|m| m.fat))
        .bind(per_serving.map(|m| m.calories))
        .bind(per_serving.map(|m| m.protein))
        .bind(per_serving.map(|m| m.carbs))
        .bind(per_serving.map(|m| m.fat))
        .bind(f.serving_grams)
        .bind(&f.serving_label)
        .bind(f.source)
        .bind(f.is_favorite)
        .fetch_one(db)
        .await
        .context("insert food")?;
    Ok(row.into())
}

/// Replaces every editable column. Usage counters are left alone.
pub async fn update(db: &PgPool, user_id: Uuid, id: Uuid, f: &NewFood) -> anyhow::Result<Option<Food>> {
    let per_100g = f.macros_per_100g;
    let per_serving = f.macros_per_serving;
    let sql = format!(
        r#"UPDATE foods SET
               name = $3, brand = $4, barcode = $5, nutrition_basis = $6,
               calories_per_100g = $7, protein_per_100g = $8, carbs_per_100g = $9, fat_per_100g = $10,
               calories_per_serving = $11, protein_per_serving = $12, carbs_per_serving = $13,
               fat_per_serving = $14, serving_grams = $15, serving_label = $16,
               is_favorite = $17, updated_at = now()
           WHERE id = $1 AND user_id = $2
           {RETURNING_FOOD}"#
    );
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(&f.name)
        .bind(&f.brand)
        .bind(&f.barcode)
        .bind(f.nutrition_basis)
        .bind(per_100g.map(|m| m.calories))
        .bind(per_100g.map(|m| m.protein))
        .bind(per_100g.map(|m| m.carbs))
        .bind(per_100g.map(|m| m.fat))
        .bind(per_serving.map(|m| m.calories))
        .bind(per_serving.map(|m| m.protein))
        .bind(per_serving.map(|m| m.carbs))
        .bind(per_serving.map(|m| m.fat))
        .bind(f.serving_grams)
        .bind(&f.serving_label)
        .bind(f.is_favorite)
        .fetch_optional(db)
        .await
        .context("update food")?;
    Ok(row.map(Food::from))
}

pub async fn set_favorite(db: &PgPool, user_id: Uuid, id: Uuid, is_favorite: bool) -> anyhow::Result<Option<Food>> {
    let sql = format!(
        "UPDATE foods SET is_favorite = $3, updated_at = now() WHERE id = $1 AND user_id = $2 {RETURNING_FOOD}"
    );
    let row = sqlx::query_as::<_, FoodRow>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(is_favorite)
        .fetch_optional(db)
        .await
        .context("set favorite")?;
    Ok(row.map(Food::from))
}

pub async fn increment_usage<'e, E: PgExecutor<'e>>(db: E, user_id: Uuid, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE foods
           SET use_count = use_count + 1, last_used_at = now()
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await
    .context("increment food usage")?;
    Ok(())
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM foods WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete food")?;
    Ok(res.rows_affected() > 0)
}

/// The subset of `ids` that are foods owned by the user.
pub async fn existing_ids(db: &PgPool, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
    let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM foods WHERE user_id = $1 AND id = ANY($2)")
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await
        .context("check food ids")?;
    Ok(found)
}
