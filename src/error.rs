#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Product {0} is out of stock")]
    OutOfStock(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Which side of the SDK an error came from.
///
/// Views use this to decide between a retry affordance (fetch failures)
/// and a silent log line (persistence failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The product source was unreachable or returned malformed data.
    Fetch,
    /// Device-local storage could not be read or written.
    Persistence,
    /// The caller asked for something that cannot be done.
    Usage,
}

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::Http(_) | ShopError::Json(_) | ShopError::NotFound(_) => ErrorKind::Fetch,
            ShopError::DuckDb(_) | ShopError::Io(_) | ShopError::Task(_) => {
                ErrorKind::Persistence
            }
            ShopError::OutOfStock(_) | ShopError::InvalidArgument(_) => ErrorKind::Usage,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
