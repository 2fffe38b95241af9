use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

use super::{ProductError, ProductLookup};
use crate::config::ProductApiConfig;

/// The subset of an Open Food Facts product this service reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub code: String,
    pub product_name: Option<String>,
    pub product_name_en: Option<String>,
    pub brands: Option<String>,
    pub serving_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub serving_quantity: Option<f64>,
    #[serde(default)]
    pub nutriments: Nutriments,
    pub image_url: Option<String>,
    pub image_front_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(rename = "energy-kcal_serving", default, deserialize_with = "lenient_f64")]
    pub energy_kcal_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat_serving: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    code: Option<String>,
    product: Option<Product>,
}

/// Open Food Facts sends numbers as JSON numbers or as strings depending on
/// who entered the product.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &ProductApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v0/product/{}.json", self.base_url, barcode)
    }
}

fn parse_response(body: ProductResponse) -> Option<Product> {
    if body.status != 1 {
        return None;
    }
    let mut product = body.product?;
    if product.code.is_empty() {
        product.code = body.code.unwrap_or_default();
    }
    Some(product)
}

#[async_trait]
impl ProductLookup for OpenFoodFactsClient {
    #[instrument(skip(self))]
    async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, ProductError> {
        let response = self
            .client
            .get(self.product_url(barcode))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProductError::Timeout
                } else {
                    ProductError::Request(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProductError::Status(status.as_u16()));
        }

        let body: ProductResponse = response.json().await?;
        let product = parse_response(body);
        debug!(barcode, found = product.is_some(), "product lookup finished");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_found_product_with_string_numbers() {
        let body: ProductResponse = serde_json::from_value(serde_json::json!({
            "status": 1,
            "code": "3017620422003",
            "product": {
                "product_name": "Nutella",
                "brands": "Ferrero",
                "serving_size": "15 g",
                "serving_quantity": "15",
                "nutriments": {
                    "energy-kcal_100g": 539,
                    "proteins_100g": 6.3,
                    "carbohydrates_100g": "57.5",
                    "fat_100g": 30.9
                }
            }
        }))
        .unwrap();

        let product = parse_response(body).expect("product");
        assert_eq!(product.code, "3017620422003");
        assert_eq!(product.serving_quantity, Some(15.0));
        assert_eq!(product.nutriments.energy_kcal_100g, Some(539.0));
        assert_eq!(product.nutriments.carbohydrates_100g, Some(57.5));
        assert_eq!(product.nutriments.fat_serving, None);
    }

    #[test]
    fn status_zero_means_not_found() {
        let body: ProductResponse = serde_json::from_value(serde_json::json!({
            "status": 0,
            "status_verbose": "product not found",
            "code": "0000"
        }))
        .unwrap();
        assert!(parse_response(body).is_none());
    }

    #[test]
    fn builds_product_url_from_base() {
        let client = OpenFoodFactsClient::new(&ProductApiConfig {
            base_url: "http://off.local".into(),
            ..ProductApiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.product_url("12345678"),
            "http://off.local/api/v0/product/12345678.json"
        );
    }
}
