use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    /// Display order on the dashboard.
    pub const ORDER: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    pub fn default_label(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snacks => "Snacks",
        }
    }

    /// Meal slot that fits an hour of the day (0-23).
    pub fn for_hour(hour: u8) -> MealType {
        match hour {
            5..=10 => MealType::Breakfast,
            11..=14 => MealType::Lunch,
            15..=19 => MealType::Dinner,
            _ => MealType::Snacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_boundaries() {
        assert_eq!(MealType::for_hour(4), MealType::Snacks);
        assert_eq!(MealType::for_hour(5), MealType::Breakfast);
        assert_eq!(MealType::for_hour(10), MealType::Breakfast);
        assert_eq!(MealType::for_hour(11), MealType::Lunch);
        assert_eq!(MealType::for_hour(15), MealType::Dinner);
        assert_eq!(MealType::for_hour(19), MealType::Dinner);
        assert_eq!(MealType::for_hour(20), MealType::Snacks);
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&MealType::Snacks).unwrap(), "\"snacks\"");
        let m: MealType = serde_json::from_str("\"lunch\"").unwrap();
        assert_eq!(m, MealType::Lunch);
    }
}
