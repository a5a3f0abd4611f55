//! The cart value type: an ordered, id-unique list of product snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::product::{Product, ProductId};

/// Ordered sequence of products with no duplicate ids.
///
/// There is no quantity field; adding an id that is already present does
/// nothing. Serializes as a plain JSON array of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from a list that may contain repeated ids.
    ///
    /// The first occurrence of each id wins and order is otherwise kept.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut cart = Self::new();
        for product in products {
            cart.insert(product);
        }
        cart
    }

    /// Append the product unless its id is already present.
    ///
    /// Returns `true` if the cart changed.
    pub fn insert(&mut self, product: Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(product);
        true
    }

    /// Drop the entry with the given id. Returns `true` if one was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Sum of the prices of every entry.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|p| p.price).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|p| p.id).collect()
    }

    pub fn into_items(self) -> Vec<Product> {
        self.items
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let products = Vec::<Product>::deserialize(deserializer)?
            .into_iter()
            .filter(|product| match product.problem() {
                Some(problem) => {
                    tracing::warn!(product_id = product.id, %problem, "dropping invalid cart entry");
                    false
                }
                None => true,
            })
            .collect();
        Ok(Cart::from_products(products))
    }
}
