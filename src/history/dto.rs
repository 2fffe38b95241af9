use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    pub end: Option<String>,
}
fn default_days() -> u32 { 7 }

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    #[serde(default = "default_dates_limit")]
    pub limit: i64,
}
fn default_dates_limit() -> i64 { 30 }
