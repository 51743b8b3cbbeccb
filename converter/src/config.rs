//! Converter configuration.

use std::time::Duration;

use fxcalc_common::{catalog, constants, Currency, DurationExt};
use fxcalc_fx::FixtureConfig;

/// Main converter configuration.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Currency shown on the base panel at startup.
    pub base_currency: Currency,
    /// Currency shown on the target panel at startup.
    pub target_currency: Currency,
    /// Seed amount for the base panel.
    pub base_amount: f64,
    /// Seed amount for the target panel.
    pub target_amount: f64,
    /// Upper bound on a single rate fetch.
    pub fetch_timeout: Duration,
    /// Fixture rate provider configuration.
    pub fixture: FixtureConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            base_currency: catalog::default_base().currency(),
            target_currency: catalog::default_target().currency(),
            base_amount: 1.0,
            target_amount: 0.0,
            fetch_timeout: constants::fetch_timeout().as_std(),
            fixture: FixtureConfig::default(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup, falling back to defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(code) = lookup("FXCALC_BASE_CURRENCY") {
            config.base_currency = Currency::new(code);
        }

        if let Some(code) = lookup("FXCALC_TARGET_CURRENCY") {
            config.target_currency = Currency::new(code);
        }

        if let Some(ms) = lookup("FXCALC_FETCH_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.fetch_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(ms) = lookup("FXCALC_MIN_LATENCY_MS") {
            if let Ok(ms) = ms.parse() {
                config.fixture.min_latency = Duration::from_millis(ms);
            }
        }

        if let Some(ms) = lookup("FXCALC_MAX_LATENCY_MS") {
            if let Ok(ms) = ms.parse() {
                config.fixture.max_latency = Duration::from_millis(ms);
            }
        }

        if let Some(seed) = lookup("FXCALC_SEED") {
            config.fixture.seed = seed.parse().ok();
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout.is_zero() {
            return Err("Fetch timeout cannot be 0".to_string());
        }

        for currency in [&self.base_currency, &self.target_currency] {
            if !currency.is_valid() {
                return Err(format!("Invalid currency code: {}", currency));
            }
        }

        if !self.base_amount.is_finite() || !self.target_amount.is_finite() {
            return Err("Seed amounts must be finite".to_string());
        }

        self.fixture.validate()
    }
}
