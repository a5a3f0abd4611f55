//! Device-local key-value persistence.
//!
//! The cart store only ever needs three things from storage: read a blob,
//! replace a blob, and forget a blob. [`KeyValueStore`] captures exactly
//! that, and the backends here provide it over a plain map, a directory of
//! files, and a DuckDB table.

pub mod duckdb_store;
pub mod file;
pub mod memory;

pub use self::duckdb_store::DuckDbStore;
pub use self::file::FileStore;
pub use self::memory::MemoryStore;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config;
use crate::error::{Result, ShopError};

/// Asynchronous string-blob storage addressed by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob under `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Which built-in backend the SDK builder should open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// One file per key in the storage directory.
    #[default]
    File,
    /// A `kv` table inside `storage.duckdb` in the storage directory.
    DuckDb,
    /// Nothing survives the process.
    Memory,
}

impl StorageBackend {
    /// Open the backend rooted at `dir`. `Memory` ignores the directory.
    pub fn open(self, dir: &Path) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self {
            StorageBackend::File => Arc::new(FileStore::new(dir)?),
            StorageBackend::DuckDb => Arc::new(DuckDbStore::open(dir.join(config::DUCKDB_FILE))?),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        })
    }
}

impl FromStr for StorageBackend {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "files" => Ok(StorageBackend::File),
            "duckdb" => Ok(StorageBackend::DuckDb),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ShopError::InvalidArgument(format!(
                "Unknown storage backend: {other}"
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::File => "file",
            StorageBackend::DuckDb => "duckdb",
            StorageBackend::Memory => "memory",
        })
    }
}

/// Reject keys that could escape a storage directory or are empty.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(ShopError::InvalidArgument(format!("Invalid storage key: {key:?}")))
    }
}

/// Run blocking storage I/O on tokio's blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ShopError::Task(format!("Task join error: {e}")))?
}
