use std::path::PathBuf;
use std::time::Duration;

pub const API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Storage key the cart blob lives under.
pub const CART_KEY: &str = "cart";

/// Number of posts requested for the catalog listing.
pub const CATALOG_LIMIT: usize = 10;

pub const LIST_LATENCY: Duration = Duration::from_millis(1000);
pub const DETAIL_LATENCY: Duration = Duration::from_millis(800);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const CATEGORIES: [&str; 5] = ["Audio", "Computing", "Wearables", "Smartphones", "Accessories"];

pub const DUCKDB_FILE: &str = "storage.duckdb";

// Environment overlay read by `ShopSdkBuilder::from_env`.
pub const ENV_STORAGE_DIR: &str = "SHOPCART_STORAGE_DIR";
pub const ENV_OFFLINE: &str = "SHOPCART_OFFLINE";
pub const ENV_API_URL: &str = "SHOPCART_API_URL";
pub const ENV_BACKEND: &str = "SHOPCART_BACKEND";

pub fn default_storage_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join("shopcart-sdk")
    } else {
        PathBuf::from(".shopcart-sdk")
    }
}

/// Interpret common truthy spellings of an environment flag.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
