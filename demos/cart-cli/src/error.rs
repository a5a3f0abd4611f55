use std::fmt;
use std::process::ExitCode;

use shopcart_sdk::{ErrorKind, ShopError};

/// Error type that knows which exit code to report.
pub struct CliError {
    pub code: u8,
    pub message: String,
}

impl CliError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: 2, message: msg.into() }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self { code: 3, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: 1, message: msg.into() }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ShopError> for CliError {
    fn from(e: ShopError) -> Self {
        match (&e, e.kind()) {
            (ShopError::NotFound(msg), _) => CliError::not_found(msg.clone()),
            (_, ErrorKind::Fetch) => {
                CliError::unavailable(format!("{e} (check your connection or use --offline)"))
            }
            _ => CliError::internal(e.to_string()),
        }
    }
}
