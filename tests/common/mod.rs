//! Shared test fixtures for the shopcart SDK integration tests.
//!
//! Provides product builders and a few instrumented [`KeyValueStore`]s:
//! one that always fails, one that records every operation, and one that
//! can hold reads or deletes open until the test lets them go.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shopcart_sdk::{KeyValueStore, MemoryStore, Product, Result, ShopError};
use tokio::sync::Notify;

/// A product with the given id and price in cents.
pub fn product(id: i64, cents: i64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        image: format!("https://picsum.photos/id/{}/500/500", 200 + id),
        description: "A thing you can buy.".to_string(),
        specs: BTreeMap::from([("warranty".to_string(), "1 year".to_string())]),
        reviews: Vec::new(),
        in_stock: true,
        category: "Audio".to_string(),
    }
}

pub fn ids(products: &[Product]) -> Vec<i64> {
    products.iter().map(|p| p.id).collect()
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Every operation fails with an I/O error.
#[derive(Default)]
pub struct FailingStore;

fn broken() -> ShopError {
    ShopError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(broken())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(broken())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(broken())
    }
}

// ---------------------------------------------------------------------------
// RecordingStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Get(String),
    Set(String, String),
    Delete(String),
}

/// A [`MemoryStore`] that logs each call.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    ops: Mutex<Vec<Op>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, Op::Set(..)))
            .count()
    }

    /// Seed a blob without recording it.
    pub async fn preload(&self, key: &str, value: &str) {
        self.inner.set(key, value).await.unwrap();
    }

    /// Read a blob without recording it.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ops.lock().unwrap().push(Op::Get(key.to_string()));
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::Set(key.to_string(), value.to_string()));
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ops.lock().unwrap().push(Op::Delete(key.to_string()));
        self.inner.delete(key).await
    }
}

// ---------------------------------------------------------------------------
// GatedStore
// ---------------------------------------------------------------------------

/// A [`MemoryStore`] whose `get` or `delete` can be made to wait for
/// [`release`](GatedStore::release).
#[derive(Default)]
pub struct GatedStore {
    inner: MemoryStore,
    hold_get: AtomicBool,
    hold_delete: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl GatedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hold_gets(&self) {
        self.hold_get.store(true, Ordering::SeqCst);
    }

    pub fn hold_deletes(&self) {
        self.hold_delete.store(true, Ordering::SeqCst);
    }

    /// Wait until a held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the held call finish.
    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn gate(&self, flag: &AtomicBool) {
        if flag.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.released.notified().await;
        }
    }
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gate(&self.hold_get).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.gate(&self.hold_delete).await;
        self.inner.delete(key).await
    }
}
