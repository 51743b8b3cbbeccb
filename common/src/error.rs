//! Error types shared across FxCalc crates.

use thiserror::Error;

/// Errors raised by currency parsing and catalog lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Code is not a three-letter ISO 4217 code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    /// Code is well formed but not in the catalog.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

impl CommonError {
    /// Get error code for log and CLI output.
    pub fn error_code(&self) -> &'static str {
        match self {
            CommonError::InvalidCurrencyCode(_) => "INVALID_CURRENCY_CODE",
            CommonError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
        }
    }
}

/// Result type alias for common operations.
pub type Result<T> = std::result::Result<T, CommonError>;
