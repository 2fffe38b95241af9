use serde::Deserialize;
use time::OffsetDateTime;

use crate::nutrition::WeightUnit;

#[derive(Debug, Deserialize)]
pub struct SaveWeightRequest {
    pub weight: f64,
    pub unit: WeightUnit,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub measured_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeightListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct WeightStatsQuery {
    #[serde(default = "default_unit")]
    pub unit: WeightUnit,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 { 30 }
fn default_unit() -> WeightUnit { WeightUnit::Kg }
