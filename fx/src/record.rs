//! Resolved exchange rate snapshots.

use chrono::Duration;
use fxcalc_common::{age_of, format_clock_local, now, Currency, CurrencyPair, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{FxError, FxResult};

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Base and target are the same currency.
    Identity,
    /// Direct entry in the rate table.
    Direct,
    /// Reciprocal of the inverse pair's table entry.
    Inverse,
    /// Placeholder generated when no table entry exists.
    Synthetic,
    /// Supplied by an external feed.
    External,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RateSource::Identity => "identity",
            RateSource::Direct => "direct",
            RateSource::Inverse => "inverse",
            RateSource::Synthetic => "synthetic",
            RateSource::External => "external",
        };
        f.write_str(s)
    }
}

/// An immutable snapshot of a resolved conversion rate.
///
/// `rate` is units of `target` per one unit of `base` and is always positive.
/// A newer fetch supersedes a record; records are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Currency being converted from.
    pub base: Currency,
    /// Currency being converted to.
    pub target: Currency,
    /// Target units per base unit.
    pub rate: f64,
    /// `1 / rate`.
    pub inverse_rate: f64,
    /// When the rate was resolved.
    pub fetched_at: Timestamp,
    /// Provenance of the rate.
    pub source: RateSource,
}

impl RateRecord {
    /// Create a record for `pair`, validating the rate.
    pub fn new(pair: &CurrencyPair, rate: f64, source: RateSource) -> FxResult<Self> {
        let invalid = !rate.is_finite() || rate <= 0.0 || (pair.is_identity() && rate != 1.0);
        if invalid {
            return Err(FxError::InvalidRate {
                pair: pair.clone(),
                rate,
            });
        }

        Ok(Self {
            id: Uuid::now_v7(),
            base: pair.base.clone(),
            target: pair.quote.clone(),
            rate,
            inverse_rate: 1.0 / rate,
            fetched_at: now(),
            source,
        })
    }

    /// Rate of 1 between a currency and itself.
    pub fn identity(currency: Currency) -> Self {
        Self {
            id: Uuid::now_v7(),
            base: currency.clone(),
            target: currency,
            rate: 1.0,
            inverse_rate: 1.0,
            fetched_at: now(),
            source: RateSource::Identity,
        }
    }

    /// The pair this record quotes.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base.clone(), self.target.clone())
    }

    /// Whether the record quotes exactly `pair`.
    pub fn quotes(&self, pair: &CurrencyPair) -> bool {
        self.base == pair.base && self.target == pair.quote
    }

    /// Units of `pair.quote` per unit of `pair.base`.
    ///
    /// Uses `inverse_rate` when the record quotes the reversed pair. A record
    /// for an unrelated pair still answers with its own rate, so a stale
    /// record keeps serving until a fresh one arrives.
    pub fn rate_for(&self, pair: &CurrencyPair) -> f64 {
        if !self.quotes(pair) && self.quotes(&pair.inverse()) {
            self.inverse_rate
        } else {
            self.rate
        }
    }

    /// Time since the record was resolved.
    pub fn age(&self) -> Duration {
        age_of(self.fetched_at)
    }

    /// Local wall-clock label for `fetched_at`, e.g. `09:41 AM`.
    pub fn fetched_at_label(&self) -> String {
        format_clock_local(self.fetched_at)
    }
}

impl fmt::Display for RateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1 {} = {} {}", self.base, self.rate, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::usd(), Currency::eur())
    }

    #[test]
    fn test_record_inverse() {
        let record = RateRecord::new(&usd_eur(), 0.8, RateSource::Direct).unwrap();

        assert_eq!(record.base, Currency::usd());
        assert_eq!(record.target, Currency::eur());
        assert_eq!(record.inverse_rate, 1.25);
        assert!(record.quotes(&usd_eur()));
        assert!(!record.quotes(&usd_eur().inverse()));
    }

    #[test]
    fn test_record_rejects_non_positive() {
        for rate in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let result = RateRecord::new(&usd_eur(), rate, RateSource::External);
            assert!(matches!(result, Err(FxError::InvalidRate { .. })), "{rate}");
        }
    }

    #[test]
    fn test_identity_rate_must_be_one() {
        let pair = CurrencyPair::new(Currency::gbp(), Currency::gbp());
        assert!(RateRecord::new(&pair, 1.1, RateSource::External).is_err());

        let record = RateRecord::identity(Currency::gbp());
        assert_eq!(record.rate, 1.0);
        assert_eq!(record.pair(), pair);
    }

    #[test]
    fn test_rate_for_follows_direction() {
        let record = RateRecord::new(&usd_eur(), 0.5, RateSource::Direct).unwrap();

        assert_eq!(record.rate_for(&usd_eur()), 0.5);
        assert_eq!(record.rate_for(&usd_eur().inverse()), 2.0);
        // Unrelated pair: the record's own rate is the best available.
        let usd_gbp = CurrencyPair::new(Currency::usd(), Currency::gbp());
        assert_eq!(record.rate_for(&usd_gbp), 0.5);
        assert_eq!(record.to_string(), "1 USD = 0.5 EUR");
    }

    #[test]
    fn test_fresh_record_age() {
        let record = RateRecord::new(&usd_eur(), 0.85, RateSource::Direct).unwrap();
        let age = record.age();
        assert!(age >= Duration::zero());
        assert!(age < Duration::seconds(5));
    }

    #[test]
    fn test_record_serializes() {
        let record = RateRecord::new(&usd_eur(), 0.85, RateSource::Inverse).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["base"], "USD");
        assert_eq!(json["source"], "inverse");

        let back: RateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.fetched_at, record.fetched_at);
        assert_eq!(back.source, RateSource::Inverse);
    }
}
