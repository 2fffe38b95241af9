use serde::Serialize;
use time::{Date, Duration};

use crate::entries::{build_tree, top_level_totals, Entry};
use crate::error::ApiError;
use crate::nutrition::{targets::day_status, DayStatus, Macros};
use crate::settings::UserSettings;

pub const HISTORY_WINDOWS: [u32; 2] = [7, 30];
pub const MAX_DATES: i64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDay {
    pub date: Date,
    pub totals: Macros,
    pub entry_count: usize,
    pub status: DayStatus,
}

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    pub start: Date,
    pub end: Date,
    pub targets: Macros,
    /// newest first
    pub days: Vec<HistoryDay>,
    /// across days with at least one entry
    pub averages: Option<Macros>,
    pub logged_days: usize,
    pub hit_days: usize,
}

pub fn check_window(days: u32) -> Result<u32, ApiError> {
    if HISTORY_WINDOWS.contains(&days) {
        Ok(days)
    } else {
        Err(ApiError::Validation("days must be 7 or 30".into()))
    }
}

pub fn window_start(end: Date, days: u32) -> Result<Date, ApiError> {
    end.checked_sub(Duration::days(i64::from(days.saturating_sub(1))))
        .ok_or_else(|| ApiError::Validation("end date is out of range".into()))
}

pub fn clamp_dates_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_DATES)
}

/// One row per calendar day from `end` back `days` days. Every day is
/// judged against today's targets.
pub fn build_history(
    end: Date,
    days: u32,
    entries: Vec<Entry>,
    settings: &UserSettings,
) -> Result<HistoryReport, ApiError> {
    let start = window_start(end, days)?;
    let targets = settings.daily_targets;

    let mut rows = Vec::with_capacity(days as usize);
    let mut date = end;
    while date >= start {
        let today: Vec<Entry> = entries.iter().filter(|e| e.date == date).cloned().collect();
        let entry_count = today.len();
        let totals = top_level_totals(&build_tree(today));
        rows.push(HistoryDay {
            date,
            totals,
            entry_count,
            status: day_status(&totals, &targets, &settings.tolerance),
        });
        match date.previous_day() {
            Some(prev) => date = prev,
            None => break,
        }
    }

    let logged: Vec<&HistoryDay> = rows.iter().filter(|d| d.entry_count > 0).collect();
    let averages = if logged.is_empty() {
        None
    } else {
        let sum: Macros = logged.iter().map(|d| d.totals).sum();
        Some(sum.scale(1.0 / logged.len() as f64).rounded())
    };
    let hit_days = rows.iter().filter(|d| d.status == DayStatus::Hit).count();

    Ok(HistoryReport {
        start,
        end,
        targets,
        logged_days: logged.len(),
        days: rows,
        averages,
        hit_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn entry(date: Date, macros: Macros) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date,
            meal: crate::nutrition::MealType::Lunch,
            food_id: None,
            food_name: "x".into(),
            amount_grams: 0.0,
            macros,
            note: None,
            parent_entry_id: None,
            is_recipe: false,
            created_at: datetime!(2024-03-01 12:00 UTC),
        }
    }

    #[test]
    fn only_seven_or_thirty_days() {
        assert!(check_window(7).is_ok());
        assert!(check_window(30).is_ok());
        assert!(check_window(14).is_err());
    }

    #[test]
    fn rows_cover_window_newest_first() {
        let end = date!(2024 - 03 - 07);
        let report = build_history(end, 7, Vec::new(), &UserSettings::default()).unwrap();
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.start, date!(2024 - 03 - 01));
        assert_eq!(report.days[0].date, end);
        assert_eq!(report.days[6].date, date!(2024 - 03 - 01));
        assert!(report.days.iter().all(|d| d.status == DayStatus::Empty));
        assert_eq!(report.averages, None);
        assert_eq!(report.logged_days, 0);
    }

    #[test]
    fn statuses_averages_and_hits() {
        let end = date!(2024 - 03 - 07);
        let entries = vec![
            // on target
            entry(date!(2024 - 03 - 07), Macros::new(2000.0, 150.0, 200.0, 65.0)),
            // over on calories
            entry(date!(2024 - 03 - 06), Macros::new(2600.0, 150.0, 200.0, 65.0)),
            entry(date!(2024 - 03 - 05), Macros::new(1000.0, 50.0, 100.0, 30.0)),
            // outside the window
            entry(date!(2024 - 02 - 20), Macros::new(5000.0, 1.0, 1.0, 1.0)),
        ];
        let report = build_history(end, 7, entries, &UserSettings::default()).unwrap();
        let statuses: Vec<DayStatus> = report.days.iter().take(4).map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![DayStatus::Hit, DayStatus::Over, DayStatus::Under, DayStatus::Empty]
        );
        assert_eq!(report.logged_days, 3);
        assert_eq!(report.hit_days, 1);
        let avg = report.averages.unwrap();
        assert_eq!(avg.calories, 1867.0);
    }

    #[test]
    fn window_before_earliest_date_is_rejected() {
        let end = crate::dates::parse_date("-9999-01-03").unwrap();
        assert!(matches!(window_start(end, 7), Err(ApiError::Validation(_))));
        assert!(build_history(end, 30, Vec::new(), &UserSettings::default()).is_err());
        assert_eq!(window_start(end, 1).unwrap(), end);
    }

    #[test]
    fn dates_limit_is_clamped() {
        assert_eq!(clamp_dates_limit(0), 1);
        assert_eq!(clamp_dates_limit(30), 30);
        assert_eq!(clamp_dates_limit(10_000), MAX_DATES);
    }
}
