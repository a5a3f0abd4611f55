use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ProductId = i64;

// ---------------------------------------------------------------------------
// Product — A catalog entry as shown on the listing and detail screens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Written as a JSON number; strings are accepted on read.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub in_stock: bool,
    pub category: String,
}

impl Product {
    /// Reason this product breaks a data-model rule, if it does.
    ///
    /// Prices must be non-negative and every review rating must lie in
    /// `1..=5`.
    pub fn problem(&self) -> Option<String> {
        if self.price < Decimal::ZERO {
            return Some(format!("negative price {}", self.price));
        }
        self.reviews
            .iter()
            .find(|r| !(1..=5).contains(&r.rating))
            .map(|r| format!("review rating {} outside 1..=5", r.rating))
    }

    /// Mean review rating, or `None` when nobody has reviewed the product.
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(sum) / self.reviews.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Review — A single user review (rating is 1 through 5)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user: String,
    pub rating: u8,
    pub comment: String,
}
