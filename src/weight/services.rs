use serde::Serialize;
use time::{macros::format_description, Duration, OffsetDateTime, UtcOffset};

use super::repo_types::{NewWeight, WeightEntry};
use crate::error::ApiError;
use crate::nutrition::{
    macros::{round1, round2},
    units::{kg_to_lb, lb_to_kg},
    WeightUnit,
};

pub const MAX_WEIGHT_ENTRIES: i64 = 365;

/// Rejects non-numbers and values no scale would show.
pub fn validate_weight(value: f64, unit: WeightUnit) -> Result<f64, ApiError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation("Enter a valid weight".into()));
    }
    let (min, max, label) = match unit {
        WeightUnit::Lb => (50.0, 700.0, "lb"),
        WeightUnit::Kg => (22.0, 320.0, "kg"),
    };
    if !(min..=max).contains(&value) {
        return Err(ApiError::Validation(format!(
            "Weight must be between {min}-{max} {label}"
        )));
    }
    Ok(value)
}

/// `manual_YYYY-MM-DD_HH:MM` in UTC. Two saves in the same minute share it.
pub fn source_row_id(measured_at: OffsetDateTime) -> String {
    let utc = measured_at.to_offset(UtcOffset::UTC);
    let stamp = utc
        .format(format_description!("[year]-[month]-[day]_[hour]:[minute]"))
        .unwrap_or_default();
    format!("manual_{stamp}")
}

/// Validates a reading and stores it in both units. The entered unit keeps
/// the exact value.
pub fn new_weight(
    value: f64,
    unit: WeightUnit,
    measured_at: OffsetDateTime,
    notes: Option<String>,
) -> Result<NewWeight, ApiError> {
    let value = validate_weight(value, unit)?;
    let (weight_kg, weight_lb) = match unit {
        WeightUnit::Kg => (value, kg_to_lb(value)),
        WeightUnit::Lb => (lb_to_kg(value), value),
    };
    Ok(NewWeight {
        measured_at,
        weight_kg,
        weight_lb,
        source_row_id: source_row_id(measured_at),
        notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    })
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_WEIGHT_ENTRIES)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStats {
    pub unit: WeightUnit,
    pub entries: usize,
    pub latest: f64,
    /// newest minus oldest
    pub change: f64,
    pub change_percent: f64,
    /// none without two readings in the last seven days
    pub seven_day_change: Option<f64>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

fn value_in(e: &WeightEntry, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => e.weight_kg,
        WeightUnit::Lb => e.weight_lb,
    }
}

/// Summary of readings ordered newest first. Needs at least two.
pub fn weight_stats(entries: &[WeightEntry], unit: WeightUnit, now: OffsetDateTime) -> Option<WeightStats> {
    if entries.len() < 2 {
        return None;
    }
    let weights: Vec<f64> = entries.iter().map(|e| value_in(e, unit)).collect();
    let latest = weights[0];
    let oldest = weights[weights.len() - 1];
    let change = latest - oldest;
    let change_percent = if oldest > 0.0 { change / oldest * 100.0 } else { 0.0 };

    let week_ago = now - Duration::days(7);
    let recent: Vec<f64> = entries
        .iter()
        .filter(|e| e.measured_at >= week_ago)
        .map(|e| value_in(e, unit))
        .collect();
    let seven_day_change = match recent.as_slice() {
        [first, .., last] => Some(round2(first - last)),
        _ => None,
    };

    let average = weights.iter().sum::<f64>() / weights.len() as f64;
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(WeightStats {
        unit,
        entries: entries.len(),
        latest,
        change: round2(change),
        change_percent: round1(change_percent),
        seven_day_change,
        average: round2(average),
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn reading(kg: f64, at: OffsetDateTime) -> WeightEntry {
        WeightEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            measured_at: at,
            weight_kg: kg,
            weight_lb: kg_to_lb(kg),
            source: "manual".into(),
            source_row_id: source_row_id(at),
            notes: None,
            created_at: at,
        }
    }

    #[test]
    fn range_checks_per_unit() {
        assert!(validate_weight(49.9, WeightUnit::Lb).is_err());
        assert!(validate_weight(50.0, WeightUnit::Lb).is_ok());
        assert!(validate_weight(700.1, WeightUnit::Lb).is_err());
        assert!(validate_weight(21.0, WeightUnit::Kg).is_err());
        assert!(validate_weight(320.0, WeightUnit::Kg).is_ok());
        assert!(validate_weight(0.0, WeightUnit::Kg).is_err());
        assert!(validate_weight(f64::NAN, WeightUnit::Kg).is_err());
    }

    #[test]
    fn row_id_is_utc_minute() {
        let at = datetime!(2024-07-01 23:30:59 -02:00);
        assert_eq!(source_row_id(at), "manual_2024-07-02_01:30");
        let same_minute = datetime!(2024-07-02 01:30:05 UTC);
        assert_eq!(source_row_id(same_minute), source_row_id(at));
    }

    #[test]
    fn converts_to_both_units() {
        let w = new_weight(180.0, WeightUnit::Lb, datetime!(2024-07-01 8:00 UTC), Some(" ".into())).unwrap();
        assert_eq!(w.weight_lb, 180.0);
        assert_eq!(w.weight_kg, 81.65);
        assert_eq!(w.notes, None);

        let w = new_weight(80.0, WeightUnit::Kg, datetime!(2024-07-01 8:00 UTC), None).unwrap();
        assert_eq!(w.weight_kg, 80.0);
        assert_eq!(w.weight_lb, 176.37);
    }

    #[test]
    fn stats_need_two_readings() {
        let now = datetime!(2024-07-10 12:00 UTC);
        assert_eq!(weight_stats(&[], WeightUnit::Kg, now), None);
        assert_eq!(weight_stats(&[reading(80.0, now)], WeightUnit::Kg, now), None);
    }

    #[test]
    fn stats_over_readings() {
        let now = datetime!(2024-07-10 12:00 UTC);
        let entries = vec![
            reading(79.0, datetime!(2024-07-10 7:00 UTC)),
            reading(79.6, datetime!(2024-07-06 7:00 UTC)),
            reading(81.0, datetime!(2024-06-20 7:00 UTC)),
            reading(80.0, datetime!(2024-06-01 7:00 UTC)),
        ];
        let s = weight_stats(&entries, WeightUnit::Kg, now).unwrap();
        assert_eq!(s.latest, 79.0);
        assert_eq!(s.change, -1.0);
        assert_eq!(s.change_percent, -1.3);
        assert_eq!(s.seven_day_change, Some(-0.6));
        assert_eq!(s.average, 79.9);
        assert_eq!(s.min, 79.0);
        assert_eq!(s.max, 81.0);
    }

    #[test]
    fn no_weekly_change_with_one_recent_reading() {
        let now = datetime!(2024-07-10 12:00 UTC);
        let entries = vec![
            reading(79.0, datetime!(2024-07-10 7:00 UTC)),
            reading(80.0, datetime!(2024-06-01 7:00 UTC)),
        ];
        let s = weight_stats(&entries, WeightUnit::Kg, now).unwrap();
        assert_eq!(s.seven_day_change, None);
    }
}
