//! Shopping-cart SDK for Rust.
//!
//! Provides the data side of a small storefront app: a product catalog
//! (bundled offline data or products fabricated from a JSONPlaceholder API),
//! and a cart store that keeps its contents durable in device-local storage.
//!
//! # Quick start
//!
//! ```no_run
//! use shopcart_sdk::ShopSdk;
//!
//! # async fn example() -> shopcart_sdk::Result<()> {
//! let sdk = ShopSdk::builder().offline(true).build().await?;
//!
//! // Browse and search the catalog
//! let audio = sdk.search("audio").await?;
//!
//! // Put something in the cart
//! sdk.add_to_cart(audio[0].id).await?;
//! println!("cart total: {}", sdk.cart().total());
//!
//! sdk.close().await;
//! # Ok(())
//! # }
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod sql_builder;
pub mod storage;

pub use cart::CartStore;
pub use catalog::{filter_products, PlaceholderCatalog, ProductSource, StaticCatalog};
pub use error::{ErrorKind, Result, ShopError};
pub use models::{Cart, Post, Product, ProductId, Review};
pub use sql_builder::SqlBuilder;
pub use storage::{DuckDbStore, FileStore, KeyValueStore, MemoryStore, StorageBackend};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ShopSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ShopSdk`] instance.
///
/// Use [`ShopSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](ShopSdkBuilder::build) to create the SDK.
pub struct ShopSdkBuilder {
    storage_dir: Option<PathBuf>,
    backend: StorageBackend,
    offline: bool,
    api_url: String,
    timeout: Duration,
    latency: Option<Duration>,
    seed: Option<u64>,
    cart_key: String,
    product_source: Option<Arc<dyn ProductSource>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Default for ShopSdkBuilder {
    fn default() -> Self {
        Self {
            storage_dir: None,
            backend: StorageBackend::default(),
            offline: false,
            api_url: config::API_URL.to_string(),
            timeout: config::HTTP_TIMEOUT,
            latency: None,
            seed: None,
            cart_key: config::CART_KEY.to_string(),
            product_source: None,
            store: None,
        }
    }
}

impl ShopSdkBuilder {
    /// Start from the defaults and apply `SHOPCART_*` environment variables.
    ///
    /// Recognized: `SHOPCART_STORAGE_DIR`, `SHOPCART_OFFLINE`,
    /// `SHOPCART_API_URL` and `SHOPCART_BACKEND` (`file`, `duckdb`, `memory`).
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::default();
        if let Ok(dir) = std::env::var(config::ENV_STORAGE_DIR) {
            builder = builder.storage_dir(dir);
        }
        if let Ok(flag) = std::env::var(config::ENV_OFFLINE) {
            builder = builder.offline(config::parse_flag(&flag));
        }
        if let Ok(url) = std::env::var(config::ENV_API_URL) {
            builder = builder.api_url(url);
        }
        if let Ok(backend) = std::env::var(config::ENV_BACKEND) {
            builder = builder.backend(backend.parse()?);
        }
        Ok(builder)
    }

    /// Set the directory file-backed storage lives in.
    ///
    /// If not set, the platform-appropriate local data directory is used
    /// (e.g. `~/.local/share/shopcart-sdk` on Linux).
    pub fn storage_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Choose the built-in storage backend. Defaults to [`StorageBackend::File`].
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, the catalog is the bundled product list and no network
    /// requests are made. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Base URL of the JSONPlaceholder-compatible API.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the simulated network latency of the online catalog.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed the online catalog's product fabrication.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Storage key for the cart blob. Defaults to `"cart"`.
    pub fn cart_key(mut self, key: impl Into<String>) -> Self {
        self.cart_key = key.into();
        self
    }

    /// Use a custom product source instead of the built-in ones.
    pub fn product_source(mut self, source: Arc<dyn ProductSource>) -> Self {
        self.product_source = Some(source);
        self
    }

    /// Use a custom store instead of opening [`backend`](Self::backend).
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the SDK: open storage, load the cart and set up the catalog.
    ///
    /// No product data is fetched here; the catalog is queried lazily.
    pub async fn build(self) -> Result<ShopSdk> {
        let storage_dir = self.storage_dir.unwrap_or_else(config::default_storage_dir);
        let store = match self.store {
            Some(store) => store,
            None => {
                let backend = self.backend;
                let dir = storage_dir.clone();
                storage::blocking(move || backend.open(&dir)).await?
            }
        };

        let catalog: Arc<dyn ProductSource> = match self.product_source {
            Some(source) => source,
            None if self.offline => Arc::new(StaticCatalog::bundled()?),
            None => {
                let mut source = PlaceholderCatalog::new(&self.api_url, self.timeout)?;
                if let Some(latency) = self.latency {
                    source = source.with_latency(latency);
                }
                if let Some(seed) = self.seed {
                    source = source.with_seed(seed);
                }
                Arc::new(source)
            }
        };

        let cart = CartStore::initialize(store, self.cart_key).await?;
        tracing::debug!(
            storage_dir = %storage_dir.display(),
            backend = %self.backend,
            offline = self.offline,
            items = cart.len(),
            "shop SDK ready"
        );

        Ok(ShopSdk {
            catalog,
            cart,
            storage_dir,
            backend: self.backend,
            offline: self.offline,
        })
    }
}

// ---------------------------------------------------------------------------
// ShopSdk
// ---------------------------------------------------------------------------

/// The main entry point for the SDK.
///
/// Owns one product source and one [`CartStore`]. Views get the cart through
/// [`cart()`](Self::cart) and clone the handle if they need to keep it.
///
/// Created via [`ShopSdk::builder()`].
pub struct ShopSdk {
    catalog: Arc<dyn ProductSource>,
    cart: CartStore,
    storage_dir: PathBuf,
    backend: StorageBackend,
    offline: bool,
}

impl ShopSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> ShopSdkBuilder {
        ShopSdkBuilder::default()
    }

    // -- Catalog -----------------------------------------------------------

    /// Every product in the catalog.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.catalog.fetch_all().await
    }

    /// A single product by id.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.catalog.fetch_by_id(id).await
    }

    /// Products whose name or category contains `query` (case-insensitive).
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let products = self.catalog.fetch_all().await?;
        Ok(filter_products(&products, query))
    }

    /// The product source backing the catalog.
    pub fn catalog(&self) -> Arc<dyn ProductSource> {
        Arc::clone(&self.catalog)
    }

    // -- Cart --------------------------------------------------------------

    /// The shared cart handle.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Fetch a product and put it in the cart.
    ///
    /// Out-of-stock products are refused with [`ShopError::OutOfStock`].
    /// Returns the product that was added (or was already present).
    pub async fn add_to_cart(&self, id: ProductId) -> Result<Product> {
        let product = self.catalog.fetch_by_id(id).await?;
        if !product.in_stock {
            tracing::info!(product_id = id, "refusing out-of-stock product");
            return Err(ShopError::OutOfStock(id));
        }
        self.cart.add(product.clone()).await;
        Ok(product)
    }

    /// Remove a product from the cart. Missing ids are ignored.
    pub fn remove_from_cart(&self, id: ProductId) {
        self.cart.remove(id);
    }

    // -- Lifecycle ---------------------------------------------------------

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Write out pending cart changes and stop the cart's background writer.
    ///
    /// The writer's storage handle is released on return. Surviving
    /// [`CartStore`] clones keep their own handle until they are dropped, and
    /// their later changes are no longer persisted.
    pub async fn close(self) {
        self.cart.close().await;
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ShopSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShopSdk(storage_dir={}, backend={}, offline={}, cart_items={})",
            self.storage_dir.display(),
            self.backend,
            self.offline,
            self.cart.len()
        )
    }
}
