//! Conversion state definitions.

use fxcalc_common::{Currency, CurrencyPair, Timestamp};
use fxcalc_fx::RateRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConverterError;

/// Which amount the keypad currently edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Base,
    Target,
}

impl Panel {
    /// The other panel.
    pub fn other(&self) -> Self {
        match self {
            Panel::Base => Panel::Target,
            Panel::Target => Panel::Base,
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Base => f.write_str("base"),
            Panel::Target => f.write_str("target"),
        }
    }
}

impl FromStr for Panel {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Panel::Base),
            "target" => Ok(Panel::Target),
            other => Err(ConverterError::UnknownPanel(other.to_string())),
        }
    }
}

/// Currencies, amounts and the active panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionState {
    pub base_currency: Currency,
    pub target_currency: Currency,
    pub base_amount: f64,
    pub target_amount: f64,
    pub active_panel: Panel,
}

impl ConversionState {
    /// Create a state with the base panel active.
    pub fn new(
        base_currency: Currency,
        target_currency: Currency,
        base_amount: f64,
        target_amount: f64,
    ) -> Self {
        Self {
            base_currency,
            target_currency,
            base_amount,
            target_amount,
            active_panel: Panel::Base,
        }
    }

    /// The pair rates must be quoted for.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base_currency.clone(), self.target_currency.clone())
    }

    /// Currency of the active panel.
    pub fn active_currency(&self) -> &Currency {
        match self.active_panel {
            Panel::Base => &self.base_currency,
            Panel::Target => &self.target_currency,
        }
    }

    /// Amount of the active panel.
    pub fn active_amount(&self) -> f64 {
        match self.active_panel {
            Panel::Base => self.base_amount,
            Panel::Target => self.target_amount,
        }
    }

    /// Write the active amount.
    pub fn set_active_amount(&mut self, amount: f64) {
        match self.active_panel {
            Panel::Base => self.base_amount = amount,
            Panel::Target => self.target_amount = amount,
        }
    }

    /// Set the currency shown on `panel`.
    pub fn set_currency(&mut self, panel: Panel, currency: Currency) {
        match panel {
            Panel::Base => self.base_currency = currency,
            Panel::Target => self.target_currency = currency,
        }
    }

    /// Derive the inactive amount from the active one.
    pub fn recompute_from_active(&mut self, rate: &RateRecord) {
        let rate = rate.rate_for(&self.pair());
        match self.active_panel {
            Panel::Base => self.target_amount = self.base_amount * rate,
            Panel::Target => self.base_amount = self.target_amount / rate,
        }
    }

    /// Derive the target amount from the base amount.
    pub fn recompute_target_from_base(&mut self, rate: &RateRecord) {
        self.target_amount = self.base_amount * rate.rate_for(&self.pair());
    }

    /// Exchange currencies and amounts. Amounts are swapped by value.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.base_currency, &mut self.target_currency);
        std::mem::swap(&mut self.base_amount, &mut self.target_amount);
    }
}

/// Point-in-time view of the coordinator for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSnapshot {
    pub conversion: ConversionState,
    pub rate: Option<RateRecord>,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub last_updated: Option<Timestamp>,
    pub last_error: Option<String>,
}

impl ConversionSnapshot {
    /// Whether `target == base * rate` holds for the current record.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        match &self.rate {
            Some(rate) => {
                let expected =
                    self.conversion.base_amount * rate.rate_for(&self.conversion.pair());
                (self.conversion.target_amount - expected).abs()
                    <= tolerance * expected.abs().max(1.0)
            }
            None => true,
        }
    }
}
