use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Calories (kcal) plus protein, carbs and fat (grams).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub const ZERO: Macros = Macros {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Builds macros from four nullable columns; any missing column means no macros.
    pub fn from_columns(
        calories: Option<f64>,
        protein: Option<f64>,
        carbs: Option<f64>,
        fat: Option<f64>,
    ) -> Option<Self> {
        Some(Self::new(calories?, protein?, carbs?, fat?))
    }

    pub fn scale(self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }

    /// Whole calories, one decimal for the gram macros.
    pub fn rounded(self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fat: round1(self.fat),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbs == 0.0 && self.fat == 0.0
    }

    pub fn any_negative(&self) -> bool {
        self.calories < 0.0 || self.protein < 0.0 || self.carbs < 0.0 || self.fat < 0.0
    }

    pub fn all_finite(&self) -> bool {
        self.calories.is_finite()
            && self.protein.is_finite()
            && self.carbs.is_finite()
            && self.fat.is_finite()
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sub for Macros {
    type Output = Macros;

    fn sub(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories - rhs.calories,
            protein: self.protein - rhs.protein,
            carbs: self.carbs - rhs.carbs,
            fat: self.fat - rhs.fat,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Macros> for Macros {
    fn sum<I: Iterator<Item = &'a Macros>>(iter: I) -> Macros {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "nutrition_basis")]
pub enum NutritionBasis {
    #[serde(rename = "per_100g")]
    #[sqlx(rename = "per_100g")]
    Per100g,
    #[serde(rename = "per_serving")]
    #[sqlx(rename = "per_serving")]
    PerServing,
}

/// The parts of a food that determine what a logged amount is worth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodNutrition {
    pub basis: NutritionBasis,
    pub per_100g: Option<Macros>,
    pub per_serving: Option<Macros>,
    pub serving_grams: Option<f64>,
}

/// Scales a food's reference macros linearly to `amount_grams`.
///
/// A per-100g food uses its per-100g set. Anything else falls back to the
/// per-serving set, which needs a serving weight to scale against. With
/// neither available the result is zero.
pub fn calculate_macros(food: &FoodNutrition, amount_grams: f64) -> Macros {
    if let (NutritionBasis::Per100g, Some(per_100g)) = (food.basis, food.per_100g) {
        return per_100g.scale(amount_grams / 100.0).rounded();
    }
    match (food.per_serving, food.serving_grams) {
        (Some(per_serving), Some(grams)) if grams > 0.0 => {
            per_serving.scale(amount_grams / grams).rounded()
        }
        _ => Macros::ZERO,
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_100g(m: Macros) -> FoodNutrition {
        FoodNutrition {
            basis: NutritionBasis::Per100g,
            per_100g: Some(m),
            per_serving: None,
            serving_grams: None,
        }
    }

    #[test]
    fn per_100g_scales_by_amount() {
        let oats = per_100g(Macros::new(389.0, 16.9, 66.3, 6.9));
        let m = calculate_macros(&oats, 40.0);
        assert_eq!(m.calories, (389.0_f64 * 0.4).round());
        assert_eq!(m.protein, 6.8);
        assert_eq!(m.carbs, 26.5);
        assert_eq!(m.fat, 2.8);
    }

    #[test]
    fn per_serving_scales_against_serving_weight() {
        let bar = FoodNutrition {
            basis: NutritionBasis::PerServing,
            per_100g: None,
            per_serving: Some(Macros::new(200.0, 20.0, 22.0, 7.0)),
            serving_grams: Some(60.0),
        };
        let m = calculate_macros(&bar, 90.0);
        assert_eq!(m, Macros::new(300.0, 30.0, 33.0, 10.5));
    }

    #[test]
    fn per_100g_basis_without_values_uses_serving_set() {
        let food = FoodNutrition {
            basis: NutritionBasis::Per100g,
            per_100g: None,
            per_serving: Some(Macros::new(100.0, 10.0, 10.0, 1.0)),
            serving_grams: Some(50.0),
        };
        assert_eq!(calculate_macros(&food, 50.0).calories, 100.0);
    }

    #[test]
    fn missing_reference_values_yield_zero() {
        let food = FoodNutrition {
            basis: NutritionBasis::PerServing,
            per_100g: None,
            per_serving: Some(Macros::new(100.0, 10.0, 10.0, 1.0)),
            serving_grams: None,
        };
        assert!(calculate_macros(&food, 120.0).is_zero());
    }

    #[test]
    fn sums_and_differences() {
        let a = Macros::new(100.0, 10.0, 5.0, 2.0);
        let b = Macros::new(50.0, 1.0, 1.0, 1.0);
        let total: Macros = [a, b].iter().sum();
        assert_eq!(total, Macros::new(150.0, 11.0, 6.0, 3.0));
        assert_eq!(total - b, a);
    }

    #[test]
    fn from_columns_requires_every_value() {
        assert!(Macros::from_columns(Some(1.0), Some(1.0), None, Some(1.0)).is_none());
        assert_eq!(
            Macros::from_columns(Some(1.0), Some(2.0), Some(3.0), Some(4.0)),
            Some(Macros::new(1.0, 2.0, 3.0, 4.0))
        );
    }

    #[test]
    fn basis_serializes_with_snake_names() {
        let json = serde_json::to_string(&NutritionBasis::Per100g).unwrap();
        assert_eq!(json, "\"per_100g\"");
        let back: NutritionBasis = serde_json::from_str("\"per_serving\"").unwrap();
        assert_eq!(back, NutritionBasis::PerServing);
    }
}
