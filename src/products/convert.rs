use serde::Serialize;

use super::client::Product;
use crate::foods::FoodSource;
use crate::nutrition::{units::parse_serving_size, Macros, NutritionBasis};

/// A food built from product data that has not been saved to the library yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodDraft {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: String,
    pub nutrition_basis: NutritionBasis,
    pub macros_per_100g: Option<Macros>,
    pub macros_per_serving: Option<Macros>,
    pub serving_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub source: FoodSource,
    pub image_url: Option<String>,
}

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Per-100g values win and are rounded to whole numbers. Products that only
/// publish per-serving values keep them when a serving weight is known.
pub fn convert_to_food_draft(product: &Product) -> FoodDraft {
    let n = &product.nutriments;

    let macros_per_100g = n.energy_kcal_100g.map(|kcal| Macros {
        calories: kcal.round(),
        protein: n.proteins_100g.unwrap_or(0.0).round(),
        carbs: n.carbohydrates_100g.unwrap_or(0.0).round(),
        fat: n.fat_100g.unwrap_or(0.0).round(),
    });

    let serving = product.serving_size.as_deref().and_then(parse_serving_size);
    let serving_grams = product
        .serving_quantity
        .filter(|q| *q > 0.0)
        .or_else(|| serving.as_ref().and_then(|s| s.grams));

    let macros_per_serving = match (macros_per_100g, serving_grams) {
        (None, Some(_)) => n.energy_kcal_serving.map(|kcal| Macros {
            calories: kcal.round(),
            protein: n.proteins_serving.unwrap_or(0.0),
            carbs: n.carbohydrates_serving.unwrap_or(0.0),
            fat: n.fat_serving.unwrap_or(0.0),
        }),
        _ => None,
    };

    let nutrition_basis = if macros_per_100g.is_none() && macros_per_serving.is_some() {
        NutritionBasis::PerServing
    } else {
        NutritionBasis::Per100g
    };

    FoodDraft {
        name: non_blank(&product.product_name)
            .or_else(|| non_blank(&product.product_name_en))
            .unwrap_or_else(|| "Unknown Product".to_string()),
        brand: non_blank(&product.brands),
        barcode: product.code.clone(),
        nutrition_basis,
        macros_per_100g,
        macros_per_serving,
        serving_grams,
        serving_label: serving.map(|s| s.label),
        source: FoodSource::OpenFoodFacts,
        image_url: non_blank(&product.image_url).or_else(|| non_blank(&product.image_front_url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::client::Nutriments;

    fn product() -> Product {
        Product {
            code: "5000159484695".into(),
            product_name: Some("Peanut Butter".into()),
            brands: Some("Acme".into()),
            serving_size: Some("2 tbsp (32 g)".into()),
            nutriments: Nutriments {
                energy_kcal_100g: Some(588.4),
                proteins_100g: Some(25.1),
                carbohydrates_100g: Some(19.6),
                fat_100g: Some(50.4),
                ..Nutriments::default()
            },
            ..Product::default()
        }
    }

    #[test]
    fn per_100g_values_are_rounded() {
        let draft = convert_to_food_draft(&product());
        assert_eq!(draft.nutrition_basis, NutritionBasis::Per100g);
        assert_eq!(draft.macros_per_100g, Some(Macros::new(588.0, 25.0, 20.0, 50.0)));
        assert_eq!(draft.serving_grams, Some(32.0));
        assert_eq!(draft.serving_label.as_deref(), Some("2 tbsp"));
        assert_eq!(draft.source, FoodSource::OpenFoodFacts);
    }

    #[test]
    fn serving_quantity_wins_over_parsed_size() {
        let mut p = product();
        p.serving_quantity = Some(30.0);
        assert_eq!(convert_to_food_draft(&p).serving_grams, Some(30.0));
    }

    #[test]
    fn name_falls_back_to_english_then_placeholder() {
        let mut p = product();
        p.product_name = Some("  ".into());
        p.product_name_en = Some("Peanut Butter EN".into());
        assert_eq!(convert_to_food_draft(&p).name, "Peanut Butter EN");

        p.product_name_en = None;
        assert_eq!(convert_to_food_draft(&p).name, "Unknown Product");
    }

    #[test]
    fn serving_only_products_use_per_serving_basis() {
        let p = Product {
            code: "1234567890123".into(),
            product_name: Some("Protein Bar".into()),
            serving_quantity: Some(60.0),
            nutriments: Nutriments {
                energy_kcal_serving: Some(210.0),
                proteins_serving: Some(20.0),
                carbohydrates_serving: Some(23.0),
                fat_serving: Some(7.5),
                ..Nutriments::default()
            },
            ..Product::default()
        };
        let draft = convert_to_food_draft(&p);
        assert_eq!(draft.nutrition_basis, NutritionBasis::PerServing);
        assert!(draft.macros_per_100g.is_none());
        assert_eq!(draft.macros_per_serving, Some(Macros::new(210.0, 20.0, 23.0, 7.5)));
    }
}
