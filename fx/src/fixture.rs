//! Fixture-backed rate provider with simulated feed latency.
//!
//! Resolution order for a pair: identity, direct table entry, reciprocal of
//! the inverse entry, then a synthetic placeholder drawn uniformly from the
//! configured fallback range.

use async_trait::async_trait;
use fxcalc_common::{constants, Currency, CurrencyPair, DurationExt};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::FxResult;
use crate::provider::RateProvider;
use crate::record::{RateRecord, RateSource};

/// Fixture table: base currency, then quote currency and rate.
const FIXTURE_RATES: &[(&str, &[(&str, f64)])] = &[
    (
        "USD",
        &[
            ("EUR", 0.85),
            ("GBP", 0.73),
            ("JPY", 110.25),
            ("CHF", 0.88),
            ("CAD", 1.25),
            ("AUD", 1.35),
            ("CNY", 6.45),
            ("INR", 74.5),
        ],
    ),
    (
        "EUR",
        &[
            ("USD", 1.18),
            ("GBP", 0.86),
            ("JPY", 129.65),
            ("CHF", 1.04),
            ("CAD", 1.47),
            ("AUD", 1.59),
            ("CNY", 7.59),
            ("INR", 87.71),
        ],
    ),
    (
        "GBP",
        &[
            ("USD", 1.37),
            ("EUR", 1.16),
            ("JPY", 151.04),
            ("CHF", 1.21),
            ("CAD", 1.71),
            ("AUD", 1.85),
            ("CNY", 8.84),
            ("INR", 102.15),
        ],
    ),
];

/// Configuration for the fixture provider.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Shortest simulated latency.
    pub min_latency: Duration,
    /// Longest simulated latency.
    pub max_latency: Duration,
    /// Lower bound for synthetic rates.
    pub fallback_min: f64,
    /// Upper bound (exclusive) for synthetic rates.
    pub fallback_max: f64,
    /// Seed for reproducible latency and synthetic rates.
    pub seed: Option<u64>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            min_latency: constants::min_simulated_latency().as_std(),
            max_latency: constants::max_simulated_latency().as_std(),
            fallback_min: 0.5,
            fallback_max: 2.5,
            seed: None,
        }
    }
}

impl FixtureConfig {
    /// Configuration without simulated latency.
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_latency > self.max_latency {
            return Err("Minimum latency cannot exceed maximum latency".to_string());
        }

        if !(self.fallback_min > 0.0) || !self.fallback_max.is_finite() {
            return Err("Fallback rate range must be positive and finite".to_string());
        }

        if self.fallback_min > self.fallback_max {
            return Err("Fallback minimum cannot exceed fallback maximum".to_string());
        }

        Ok(())
    }
}

/// Serves rates from a fixed table after a randomized delay.
pub struct FixtureRateProvider {
    table: HashMap<CurrencyPair, f64>,
    config: FixtureConfig,
    rng: Mutex<StdRng>,
}

impl FixtureRateProvider {
    /// Create a provider with the built-in table and default configuration.
    pub fn new() -> Self {
        Self::with_config(FixtureConfig::default())
    }

    /// Create a provider with custom configuration.
    pub fn with_config(config: FixtureConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let table = FIXTURE_RATES
            .iter()
            .flat_map(|(base, quotes)| {
                quotes.iter().map(move |(quote, rate)| {
                    (CurrencyPair::new(Currency::new(*base), Currency::new(*quote)), *rate)
                })
            })
            .collect();

        Self {
            table,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Add or replace a table entry.
    pub fn with_rate(mut self, pair: CurrencyPair, rate: f64) -> Self {
        self.table.insert(pair, rate);
        self
    }

    /// Resolve a rate without latency.
    pub fn resolve(&self, pair: &CurrencyPair) -> (f64, RateSource) {
        if pair.is_identity() {
            return (1.0, RateSource::Identity);
        }

        if let Some(rate) = self.table.get(pair) {
            return (*rate, RateSource::Direct);
        }

        if let Some(rate) = self.table.get(&pair.inverse()) {
            return (1.0 / rate, RateSource::Inverse);
        }

        let (lo, hi) = (self.config.fallback_min, self.config.fallback_max);
        let rate = if lo < hi {
            self.rng.lock().gen_range(lo..hi)
        } else {
            lo
        };
        debug!(pair = %pair, rate, "No fixture rate, synthesized placeholder");
        (rate, RateSource::Synthetic)
    }

    fn sample_latency(&self) -> Duration {
        let (lo, hi) = (self.config.min_latency, self.config.max_latency);
        if lo >= hi {
            return lo;
        }
        let millis = self
            .rng
            .lock()
            .gen_range(lo.as_millis() as u64..=hi.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

impl Default for FixtureRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for FixtureRateProvider {
    fn name(&self) -> &str {
        "FIXTURE"
    }

    #[instrument(skip(self), fields(pair = %pair))]
    async fn fetch_rate(&self, pair: &CurrencyPair) -> FxResult<RateRecord> {
        let latency = self.sample_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let (rate, source) = self.resolve(pair);
        let record = RateRecord::new(pair, rate, source)?;

        debug!(
            rate = record.rate,
            source = %record.source,
            latency_ms = latency.as_millis() as u64,
            "Resolved fixture rate"
        );

        Ok(record)
    }
}
