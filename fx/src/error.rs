//! FX error types.

use fxcalc_common::CurrencyPair;
use thiserror::Error;

/// Errors that can occur while resolving a rate.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// Rate not available for the requested currency pair.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// Provider returned an error.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// Fetch did not complete in time.
    #[error("Rate fetch for {pair} timed out after {timeout_ms}ms")]
    Timeout { pair: CurrencyPair, timeout_ms: u64 },

    /// Rate is not a positive finite number, or is not 1 for an identity pair.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: f64 },
}

impl FxError {
    /// Check if retrying the fetch may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::ProviderError(_) | FxError::Timeout { .. })
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
