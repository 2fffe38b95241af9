//! Pure nutrition arithmetic: macro scaling, unit conversion, meal slots
//! and target evaluation. Nothing in here touches the database.

pub mod macros;
pub mod meals;
pub mod targets;
pub mod units;

pub use macros::{calculate_macros, FoodNutrition, Macros, NutritionBasis};
pub use meals::MealType;
pub use targets::{DayStatus, Tolerance};
pub use units::{MassUnit, WeightUnit};
