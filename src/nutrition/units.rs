use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::macros::round2;

pub const GRAMS_PER_OUNCE: f64 = 28.3495;
pub const LB_TO_KG: f64 = 0.45359237;
pub const KG_TO_LB: f64 = 2.20462262;

/// Unit a food amount is entered in. Stored as the user's preferred unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "mass_unit", rename_all = "lowercase")]
pub enum MassUnit {
    #[default]
    G,
    Oz,
}

impl MassUnit {
    pub fn to_grams(self, amount: f64) -> f64 {
        match self {
            MassUnit::G => amount,
            MassUnit::Oz => ounces_to_grams(amount),
        }
    }
}

/// Unit a body weight is entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Lb,
    Kg,
}

#[cfg(test)]
pub fn grams_to_ounces(grams: f64) -> f64 {
    grams / GRAMS_PER_OUNCE
}

pub fn ounces_to_grams(ounces: f64) -> f64 {
    ounces * GRAMS_PER_OUNCE
}

pub fn lb_to_kg(lb: f64) -> f64 {
    round2(lb * LB_TO_KG)
}

pub fn kg_to_lb(kg: f64) -> f64 {
    round2(kg * KG_TO_LB)
}

/// A serving description split into a display label and, when the text
/// carries one, its weight in grams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServingSize {
    pub label: String,
    pub grams: Option<f64>,
}

lazy_static! {
    static ref PAREN_RE: Regex = Regex::new(r"\(([^)]*)\)").unwrap();
    static ref QUANTITY_RE: Regex =
        Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(grams?|gr|g|ml|oz)\b").unwrap();
}

fn quantity_grams(text: &str) -> Option<f64> {
    let caps = QUANTITY_RE.captures(text)?;
    let value: f64 = caps[1].replace(',', ".").parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();
    let grams = if unit == "oz" {
        ounces_to_grams(value)
    } else {
        value
    };
    Some(round2(grams))
}

/// Parses free-text serving sizes such as `"30 g"`, `"1 cup (240 ml)"` or
/// `"2 oz"`. Millilitres are taken as grams. Returns `None` for blank input.
pub fn parse_serving_size(text: &str) -> Option<ServingSize> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = PAREN_RE.captures(text) {
        if let Some(grams) = quantity_grams(&caps[1]) {
            let outer = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let label = text[..outer].trim();
            return Some(ServingSize {
                label: if label.is_empty() { text } else { label }.to_string(),
                grams: Some(grams),
            });
        }
    }

    Some(ServingSize {
        label: text.to_string(),
        grams: quantity_grams(text),
    })
}
