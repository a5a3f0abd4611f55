//! Product sources for the catalog and detail screens.
//!
//! A [`ProductSource`] hands out [`Product`] records. The cart never talks to
//! a source directly and only receives products that a view already holds.
//! [`StaticCatalog`] serves the bundled offline catalog and
//! [`PlaceholderCatalog`] fabricates products from a JSONPlaceholder API.

pub mod fixture;
pub mod placeholder;

pub use fixture::StaticCatalog;
pub use placeholder::PlaceholderCatalog;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Product, ProductId};

/// Asynchronous supplier of catalog data.
#[async_trait]
pub trait ProductSource: Send + Sync + 'static {
    /// Every product in the catalog, in display order.
    async fn fetch_all(&self) -> Result<Vec<Product>>;

    /// A single product. Fails with [`ShopError::NotFound`](crate::ShopError::NotFound)
    /// if there is no product with that id.
    async fn fetch_by_id(&self, id: ProductId) -> Result<Product>;
}

/// Filter products by a free-text query against name and category.
///
/// Matching is case-insensitive substring search. A blank query (after
/// trimming) keeps everything. Order is preserved.
pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    let query = query.trim();
    if query.is_empty() {
        return products.to_vec();
    }
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
