//! FxCalc FX Rates
//!
//! Exchange rate resolution for the converter.
//!
//! # Features
//!
//! - Immutable [`RateRecord`] snapshots with inverse rate and fetch time
//! - [`RateProvider`] trait so the rate source can be swapped out
//! - [`FixtureRateProvider`] serving a fixed rate table with simulated latency
//!
//! # Example
//!
//! ```rust,ignore
//! use fxcalc_fx::{FixtureRateProvider, RateProvider};
//! use fxcalc_common::{Currency, CurrencyPair};
//!
//! let provider = FixtureRateProvider::new();
//! let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
//! let record = provider.fetch_rate(&pair).await?;
//! assert_eq!(record.rate, 0.85);
//! ```

pub mod error;
pub mod fixture;
pub mod provider;
pub mod record;

pub use error::{FxError, FxResult};
pub use fixture::{FixtureConfig, FixtureRateProvider};
pub use provider::{RateProvider, SharedRateProvider};
pub use record::{RateRecord, RateSource};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
