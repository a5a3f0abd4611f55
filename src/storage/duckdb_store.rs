//! DuckDB-backed store.
//!
//! Keeps every blob in a single two-column table. DuckDB calls block, so each
//! operation hops onto the blocking pool and takes the connection lock there.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use duckdb::Connection as DuckDbConnection;

use super::{blocking, validate_key, KeyValueStore};
use crate::error::{Result, ShopError};
use crate::sql_builder::SqlBuilder;

const TABLE: &str = "kv";
const KEY_COL: &str = "store_key";
const VALUE_COL: &str = "store_value";

pub struct DuckDbStore {
    conn: Arc<Mutex<DuckDbConnection>>,
    path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = DuckDbConnection::open(&path)?;
        Self::init(conn, Some(path))
    }

    /// Open a store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: DuckDbConnection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} ({KEY_COL} VARCHAR PRIMARY KEY, {VALUE_COL} VARCHAR NOT NULL)"
        ))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Database file path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DuckDbConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ShopError::Task("DuckDB connection lock poisoned".into()))?;
            f(&guard)
        })
        .await
    }
}

#[async_trait]
impl KeyValueStore for DuckDbStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let (sql, params) = SqlBuilder::new(TABLE)
            .select(&[VALUE_COL])
            .where_eq(KEY_COL, key)
            .limit(1)
            .build();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let param_values: Vec<&dyn duckdb::ToSql> =
                params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
            let mut rows = stmt.query(param_values.as_slice())?;
            let value = match rows.next()? {
                Some(row) => Some(row.get::<_, String>(0)?),
                None => None,
            };
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT OR REPLACE INTO {TABLE} ({KEY_COL}, {VALUE_COL}) VALUES (?, ?)"),
                duckdb::params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                &format!("DELETE FROM {TABLE} WHERE {KEY_COL} = ?"),
                duckdb::params![key],
            )?;
            Ok(())
        })
        .await
    }
}
