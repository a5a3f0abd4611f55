use async_trait::async_trait;

use super::ProductSource;
use crate::error::{Result, ShopError};
use crate::models::{Product, ProductId};

const BUNDLED_PRODUCTS: &str = include_str!("../../data/products.json");

/// In-memory catalog, used offline and in tests.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The five-product catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(BUNDLED_PRODUCTS)?;
        Ok(Self::new(products))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[async_trait]
impl ProductSource for StaticCatalog {
    async fn fetch_all(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn fetch_by_id(&self, id: ProductId) -> Result<Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ShopError::NotFound(format!("Product {id}")))
    }
}
