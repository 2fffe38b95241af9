//! Barcode lookups against the Open Food Facts product database.

pub mod client;
pub mod convert;
pub mod handlers;

use async_trait::async_trait;
use axum::Router;
use thiserror::Error;

use crate::state::AppState;

pub use client::{OpenFoodFactsClient, Product};
pub use convert::{convert_to_food_draft, FoodDraft};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product lookup timed out")]
    Timeout,
    #[error("product service returned status {0}")]
    Status(u16),
    #[error("product request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Source of product data keyed by barcode.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// `Ok(None)` when the database has no product for the code.
    async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, ProductError>;
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}

/// EAN-8, UPC-A, EAN-13 and GTIN-14 codes are all plain digit strings.
pub fn is_valid_barcode(code: &str) -> bool {
    (4..=14).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barcode_shape() {
        assert!(is_valid_barcode("3017620422003"));
        assert!(is_valid_barcode("12345678"));
        assert!(!is_valid_barcode("123"));
        assert!(!is_valid_barcode("30176204220031234"));
        assert!(!is_valid_barcode("../etc/passwd"));
    }
}
