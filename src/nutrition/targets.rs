use serde::{Deserialize, Serialize};

use super::macros::Macros;

/// How far off a day may be and still count as hitting its targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// grams, applied to protein, carbs and fat
    pub macros: f64,
    /// kcal
    pub calories: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            macros: 5.0,
            calories: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Empty,
    Hit,
    Over,
    Under,
}

pub fn is_hit(totals: &Macros, targets: &Macros, tolerance: &Tolerance) -> bool {
    (totals.calories - targets.calories).abs() <= tolerance.calories
        && (totals.protein - targets.protein).abs() <= tolerance.macros
        && (totals.carbs - targets.carbs).abs() <= tolerance.macros
        && (totals.fat - targets.fat).abs() <= tolerance.macros
}

pub fn is_over(totals: &Macros, targets: &Macros) -> bool {
    totals.calories > targets.calories
        || totals.protein > targets.protein
        || totals.carbs > targets.carbs
        || totals.fat > targets.fat
}

/// A day with no calories logged is empty; hitting within tolerance wins
/// over being slightly above a target.
pub fn day_status(totals: &Macros, targets: &Macros, tolerance: &Tolerance) -> DayStatus {
    if totals.calories <= 0.0 {
        DayStatus::Empty
    } else if is_hit(totals, targets, tolerance) {
        DayStatus::Hit
    } else if is_over(totals, targets) {
        DayStatus::Over
    } else {
        DayStatus::Under
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Macros {
        Macros::new(2000.0, 150.0, 200.0, 65.0)
    }

    #[test]
    fn within_tolerance_is_hit_even_when_slightly_over() {
        let totals = Macros::new(2040.0, 154.0, 196.0, 66.0);
        assert_eq!(day_status(&totals, &targets(), &Tolerance::default()), DayStatus::Hit);
    }

    #[test]
    fn one_macro_over_outside_tolerance_is_over() {
        let totals = Macros::new(1900.0, 170.0, 180.0, 60.0);
        assert_eq!(day_status(&totals, &targets(), &Tolerance::default()), DayStatus::Over);
    }

    #[test]
    fn short_everywhere_is_under() {
        let totals = Macros::new(1200.0, 90.0, 120.0, 40.0);
        assert_eq!(day_status(&totals, &targets(), &Tolerance::default()), DayStatus::Under);
    }

    #[test]
    fn no_calories_is_empty() {
        assert_eq!(
            day_status(&Macros::ZERO, &targets(), &Tolerance::default()),
            DayStatus::Empty
        );
    }
}
