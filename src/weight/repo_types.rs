use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const MANUAL_SOURCE: &str = "manual";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WeightEntry {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub measured_at: OffsetDateTime,
    pub weight_kg: f64,
    pub weight_lb: f64,
    pub source: String,
    pub source_row_id: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWeight {
    pub measured_at: OffsetDateTime,
    pub weight_kg: f64,
    pub weight_lb: f64,
    pub source_row_id: String,
    pub notes: Option<String>,
}
