//! Product source that fabricates a catalog from JSONPlaceholder posts.
//!
//! Each post becomes a product: the title is the name, the body the
//! description, and price, category, image, specs, reviews and stock status
//! are drawn from an RNG. Seed the RNG for a reproducible catalog.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;

use super::ProductSource;
use crate::config;
use crate::error::{Result, ShopError};
use crate::models::{Post, Product, ProductId, Review};

pub struct PlaceholderCatalog {
    base_url: String,
    client: Client,
    limit: usize,
    list_latency: Duration,
    detail_latency: Duration,
    rng: Mutex<StdRng>,
}

impl PlaceholderCatalog {
    /// Create a source against `base_url` with the given HTTP timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            limit: config::CATALOG_LIMIT,
            list_latency: config::LIST_LATENCY,
            detail_latency: config::DETAIL_LATENCY,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Simulated network latency applied before every request.
    ///
    /// `Duration::ZERO` disables the delay. The same value is used for list
    /// and detail fetches.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.list_latency = latency;
        self.detail_latency = latency;
        self
    }

    /// Make fabricated fields reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Number of posts to request for the listing.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fabricate(&self, post: &Post) -> Product {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        product_from_post(post, &mut *rng)
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl ProductSource for PlaceholderCatalog {
    async fn fetch_all(&self) -> Result<Vec<Product>> {
        simulate_latency(self.list_latency).await;
        let url = format!("{}/posts?_limit={}", self.base_url, self.limit);
        tracing::debug!(%url, "fetching product listing");

        let posts: Vec<Post> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(posts.iter().map(|post| self.fabricate(post)).collect())
    }

    async fn fetch_by_id(&self, id: ProductId) -> Result<Product> {
        simulate_latency(self.detail_latency).await;
        let url = format!("{}/posts/{}", self.base_url, id);
        tracing::debug!(%url, product_id = id, "fetching product");

        let resp = self.client.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ShopError::NotFound(format!("Product {id}")));
        }
        let post: Post = resp.error_for_status()?.json().await?;
        Ok(self.fabricate(&post))
    }
}

/// Turn a post into a product, drawing the invented fields from `rng`.
pub fn product_from_post<R: Rng + ?Sized>(post: &Post, rng: &mut R) -> Product {
    let price = Decimal::from(rng.gen_range(50i64..500));
    let category = config::CATEGORIES[rng.gen_range(0..config::CATEGORIES.len())].to_string();
    let image = format!("https://picsum.photos/id/{}/500/500", 200 + rng.gen_range(1..=10));

    let mut specs = BTreeMap::new();
    specs.insert(
        "batteryLife".to_string(),
        format!("{} hours", rng.gen_range(5..25)),
    );
    specs.insert("connectivity".to_string(), "Bluetooth 5.0".to_string());
    specs.insert("weight".to_string(), format!("{}g", rng.gen_range(100..300)));
    specs.insert(
        "dimensions".to_string(),
        format!("{} x {} cm", rng.gen_range(5..15), rng.gen_range(5..15)),
    );
    specs.insert("warranty".to_string(), "1 year".to_string());

    let first_sentence = post.body.split('.').next().unwrap_or_default();
    let review_count = rng.gen_range(1..=3);
    let reviews = (0..review_count)
        .map(|_| Review {
            user: format!("User{}", rng.gen_range(0..1000)),
            rating: rng.gen_range(1..=5),
            comment: format!(
                "This is a {} product. {}.",
                if rng.gen_bool(0.5) { "great" } else { "decent" },
                first_sentence
            ),
        })
        .collect();

    Product {
        id: post.id,
        name: capitalize(&post.title),
        price,
        image,
        description: post.body.clone(),
        specs,
        reviews,
        in_stock: rng.gen_bool(0.8),
        category,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
