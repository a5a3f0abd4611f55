//! The cart store: authoritative cart contents plus a durable copy.
//!
//! [`CartStore`] is a cheap, cloneable handle. Build one at startup and pass
//! clones to whatever needs the cart; every clone sees the same contents.
//!
//! Memory is the source of truth. Every mutation updates the in-memory
//! [`Cart`] first and then queues a full serialized copy for the background
//! writer, so storage trouble shows up in the logs and nowhere else.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shopcart_sdk::{CartStore, MemoryStore, StaticCatalog, ProductSource};
//!
//! # async fn example() -> shopcart_sdk::Result<()> {
//! let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart").await?;
//! let headphones = StaticCatalog::bundled()?.fetch_by_id(1).await?;
//! cart.add(headphones).await;
//! println!("{} item(s), total {}", cart.len(), cart.total());
//! # Ok(())
//! # }
//! ```

mod writer;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tokio::sync::{oneshot, watch};

use crate::error::{Result, ShopError};
use crate::models::{Cart, Product, ProductId};
use crate::storage::KeyValueStore;
use writer::{Job, JobSender};

struct Inner {
    cart: Mutex<Cart>,
    key: String,
    store: Arc<dyn KeyValueStore>,
    writer: JobSender,
    changes: watch::Sender<Cart>,
    loaded: AtomicBool,
    in_flight: AtomicUsize,
}

/// Shared handle to the cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

/// Marks an operation as in flight for [`CartStore::is_loading`].
struct Busy<'a>(&'a AtomicUsize);

impl<'a> Busy<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Busy(counter)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CartStore {
    /// Create an empty, not-yet-loaded store persisting under `key`.
    ///
    /// Must be called from within a tokio runtime, which hosts the
    /// background writer. [`is_loading`](Self::is_loading) reports `true`
    /// until [`load`](Self::load) completes.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ShopError::Task(format!("Cart store needs a tokio runtime: {e}")))?;
        let key = key.into();
        let writer = writer::spawn(&handle, Arc::clone(&store), key.clone());
        let (changes, _) = watch::channel(Cart::new());
        Ok(Self {
            inner: Arc::new(Inner {
                cart: Mutex::new(Cart::new()),
                key,
                store,
                writer,
                changes,
                loaded: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
            }),
        })
    }

    /// Create a store and load whatever was persisted under `key`.
    ///
    /// Storage failures and unparseable blobs are logged and yield an empty
    /// cart; the only error is a missing tokio runtime.
    pub async fn initialize(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let cart = Self::new(store, key)?;
        cart.load().await;
        Ok(cart)
    }

    /// Read the persisted cart into memory.
    ///
    /// Nothing is written until the first load completes. Products added
    /// before then are kept, after the persisted ones, and the merged cart is
    /// written back.
    pub async fn load(&self) {
        let _busy = Busy::enter(&self.inner.in_flight);
        let key = &self.inner.key;

        let persisted = match self.inner.store.get(key).await {
            Ok(Some(blob)) => match serde_json::from_str::<Cart>(&blob) {
                Ok(cart) => cart,
                Err(e) => {
                    tracing::error!(%key, error = %e, "stored cart is unreadable; starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::error!(%key, error = %e, "failed to load cart from storage");
                Cart::new()
            }
        };

        {
            let mut cart = self.lock();
            let pending = std::mem::take(&mut *cart);
            let had_pending = !pending.is_empty();
            let mut merged = persisted;
            for product in pending.into_items() {
                merged.insert(product);
            }
            *cart = merged;
            self.inner.loaded.store(true, Ordering::SeqCst);
            tracing::debug!(%key, items = cart.len(), "cart loaded");
            self.publish(&cart);
            if had_pending {
                self.queue_save(&cart);
            }
        }
    }

    /// Add a product unless one with the same id is already in the cart.
    ///
    /// A save is queued either way.
    pub async fn add(&self, product: Product) {
        let _busy = Busy::enter(&self.inner.in_flight);
        let id = product.id;
        let mut cart = self.lock();
        if cart.insert(product) {
            tracing::debug!(product_id = id, "added to cart");
            self.publish(&cart);
        } else {
            tracing::debug!(product_id = id, "already in cart");
        }
        self.queue_save(&cart);
    }

    /// Remove the product with `id`, if present, and queue a save.
    pub fn remove(&self, id: ProductId) {
        let mut cart = self.lock();
        if cart.remove(id) {
            tracing::debug!(product_id = id, "removed from cart");
            self.publish(&cart);
        }
        self.queue_save(&cart);
    }

    /// Empty the cart and delete the stored blob.
    ///
    /// Waits for the delete to be attempted, so on return the blob is gone
    /// unless storage failed (which is logged).
    pub async fn clear(&self) {
        let _busy = Busy::enter(&self.inner.in_flight);
        let (done, acked) = oneshot::channel();
        {
            let mut cart = self.lock();
            cart.clear();
            self.publish(&cart);
            self.send(Job::Delete { done });
        }
        let _ = acked.await;
    }

    /// Wait until every queued write has been attempted.
    pub async fn flush(&self) {
        let (done, acked) = oneshot::channel();
        self.send(Job::Flush { done });
        let _ = acked.await;
    }

    /// Drain queued writes and stop the background writer.
    ///
    /// The in-memory cart keeps working afterwards, but later changes are
    /// no longer persisted. Used when the owner is shutting down and wants
    /// the writer's hold on storage released.
    pub async fn close(&self) {
        let (done, acked) = oneshot::channel();
        self.send(Job::Shutdown { done });
        let _ = acked.await;
    }

    /// Current cart contents, in insertion order.
    pub fn cart(&self) -> Vec<Product> {
        self.lock().items().to_vec()
    }

    /// A copy of the current cart value.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    /// `true` before the first load completes and while add, clear or load
    /// is running.
    pub fn is_loading(&self) -> bool {
        !self.inner.loaded.load(Ordering::SeqCst) || self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Sum of prices over the current cart.
    pub fn total(&self) -> Decimal {
        self.lock().total()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.lock().contains(id)
    }

    /// Storage key the cart is persisted under.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Receive a fresh snapshot after every change to the contents.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.changes.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, cart: &Cart) {
        self.inner.changes.send_replace(cart.clone());
    }

    // Called with the cart lock held so queue order matches mutation order.
    fn queue_save(&self, cart: &Cart) {
        if !self.inner.loaded.load(Ordering::SeqCst) {
            tracing::debug!(key = %self.inner.key, "cart not loaded yet; save deferred");
            return;
        }
        match serde_json::to_string(cart) {
            Ok(blob) => self.send(Job::Save(blob)),
            Err(e) => {
                tracing::error!(key = %self.inner.key, error = %e, "failed to serialize cart");
            }
        }
    }

    fn send(&self, job: Job) {
        if self.inner.writer.send(job).is_err() {
            tracing::warn!(key = %self.inner.key, "cart writer is gone; change not persisted");
        }
    }
}
