//! Rate provider trait and test implementation.

use async_trait::async_trait;
use fxcalc_common::CurrencyPair;
use std::sync::Arc;

use crate::error::FxResult;
use crate::record::RateRecord;

/// Trait for FX rate sources.
///
/// Calls are independent; a provider never coordinates overlapping fetches.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Resolve the current rate for a currency pair.
    async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<RateRecord>;

    /// Check if this provider can quote the given pair.
    fn supports_pair(&self, _pair: &CurrencyPair) -> bool {
        true
    }
}

/// Shared rate provider handle.
pub type SharedRateProvider = Arc<dyn RateProvider>;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateProvider;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::error::FxError;
    use crate::record::RateSource;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scriptable provider for tests: per-pair rates, delays and failures.
    pub struct MockRateProvider {
        name: String,
        rates: DashMap<CurrencyPair, f64>,
        delays: DashMap<CurrencyPair, Duration>,
        failures: DashMap<CurrencyPair, String>,
        calls: AtomicUsize,
    }

    impl MockRateProvider {
        /// Create a new mock provider.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                rates: DashMap::new(),
                delays: DashMap::new(),
                failures: DashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        /// Set a rate for a currency pair.
        pub fn set_rate(&self, pair: CurrencyPair, rate: f64) {
            self.rates.insert(pair, rate);
        }

        /// Delay responses for a currency pair.
        pub fn set_delay(&self, pair: CurrencyPair, delay: Duration) {
            self.delays.insert(pair, delay);
        }

        /// Make fetches for a pair fail with a provider error.
        pub fn fail_pair(&self, pair: CurrencyPair, message: impl Into<String>) {
            self.failures.insert(pair, message.into());
        }

        /// Stop failing fetches for a pair.
        pub fn heal_pair(&self, pair: &CurrencyPair) {
            self.failures.remove(pair);
        }

        /// Number of fetches started so far.
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<RateRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self.delays.get(pair).map(|d| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(message) = self.failures.get(pair) {
                return Err(FxError::ProviderError(message.value().clone()));
            }

            if pair.is_identity() {
                return Ok(RateRecord::identity(pair.base.clone()));
            }

            let rate = self.rates.get(pair).map(|r| *r);
            match rate {
                Some(rate) => RateRecord::new(pair, rate, RateSource::External),
                None => Err(FxError::RateNotAvailable(pair.clone())),
            }
        }

        fn supports_pair(&self, pair: &CurrencyPair) -> bool {
            pair.is_identity() || self.rates.contains_key(pair)
        }
    }
}
