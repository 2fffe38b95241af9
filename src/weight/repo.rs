use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewWeight, WeightEntry, MANUAL_SOURCE};

const WEIGHT_COLUMNS: &str =
    "id, user_id, measured_at, weight_kg, weight_lb, source, source_row_id, notes, created_at";

/// Inserts a reading, replacing any reading from the same minute.
pub async fn upsert(db: &PgPool, user_id: Uuid, w: &NewWeight) -> anyhow::Result<WeightEntry> {
    let sql = format!(
        r#"INSERT INTO body_weight_entries
               (user_id, measured_at, weight_kg, weight_lb, source, source_row_id, notes)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           ON CONFLICT (user_id, source_row_id) DO UPDATE SET
               measured_at = EXCLUDED.measured_at,
               weight_kg = EXCLUDED.weight_kg,
               weight_lb = EXCLUDED.weight_lb,
               notes = EXCLUDED.notes,
               updated_at = now()
           RETURNING {WEIGHT_COLUMNS}"#
    );
    let row = sqlx::query_as::<_, WeightEntry>(&sql)
        .bind(user_id)
        .bind(w.measured_at)
        .bind(w.weight_kg)
        .bind(w.weight_lb)
        .bind(MANUAL_SOURCE)
        .bind(&w.source_row_id)
        .bind(&w.notes)
        .fetch_one(db)
        .await
        .context("upsert weight")?;
    Ok(row)
}

/// Newest first.
pub async fn list(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<WeightEntry>> {
    let sql = format!(
        "SELECT {WEIGHT_COLUMNS} FROM body_weight_entries
         WHERE user_id = $1 ORDER BY measured_at DESC LIMIT $2"
    );
    sqlx::query_as::<_, WeightEntry>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list weights")
}

pub async fn latest(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<WeightEntry>> {
    Ok(list(db, user_id, 1).await?.into_iter().next())
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM body_weight_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete weight")?;
    Ok(res.rows_affected() > 0)
}
