//! Keypad session: routes key presses through the calculator into the
//! coordinator's active amount.

use fxcalc_calculator::{Calculator, CalculatorState, Key};
use fxcalc_common::{catalog, Currency};
use serde::Serialize;
use tracing::debug;

use crate::config::ConverterConfig;
use crate::coordinator::ConversionCoordinator;
use crate::error::{ConverterError, ConverterResult};
use crate::state::Panel;

/// What the keypad should render after a key press.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyOutcome {
    /// Value produced by the key, if any.
    pub result: Option<f64>,
    /// Calculator display after the key.
    pub display: String,
}

/// A calculator bound to a conversion coordinator.
pub struct ConverterSession {
    calculator: Calculator,
    coordinator: ConversionCoordinator,
}

impl ConverterSession {
    /// Create a session around an existing coordinator.
    pub fn new(coordinator: ConversionCoordinator) -> Self {
        Self {
            calculator: Calculator::new(),
            coordinator,
        }
    }

    /// Validate `config` and build a fixture-backed session.
    pub fn from_config(config: ConverterConfig) -> ConverterResult<Self> {
        config.validate().map_err(ConverterError::Configuration)?;
        Ok(Self::new(ConversionCoordinator::with_fixture(config)))
    }

    /// Press a key. A produced value is written to the active amount.
    pub fn press(&mut self, key: Key) -> KeyOutcome {
        let result = self.calculator.press(key);
        if let Some(amount) = result {
            self.coordinator.apply_calculator_result(amount);
        }

        debug!(key = %key, display = self.calculator.display(), ?result, "Key pressed");

        KeyOutcome {
            result,
            display: self.calculator.display().to_string(),
        }
    }

    /// Parse and press a compact key string such as `"12.5×4="`.
    ///
    /// Nothing is pressed if any character fails to parse.
    pub fn press_sequence(&mut self, input: &str) -> ConverterResult<KeyOutcome> {
        let keys = Key::parse_sequence(input)?;
        let mut outcome = KeyOutcome {
            result: None,
            display: self.calculator.display().to_string(),
        };
        for key in keys {
            outcome = self.press(key);
        }
        Ok(outcome)
    }

    pub fn set_active_panel(&self, panel: Panel) {
        self.coordinator.set_active_panel(panel);
    }

    /// Hand the keypad to the other panel and return it.
    pub fn toggle_active_panel(&self) -> Panel {
        let panel = self.coordinator.active_panel().other();
        self.coordinator.set_active_panel(panel);
        panel
    }

    pub fn select_currency(&self, panel: Panel, currency: impl Into<Currency>) {
        self.coordinator.select_currency(panel, currency);
    }

    /// Like [`select_currency`](Self::select_currency), but rejects codes
    /// that are malformed or missing from the catalog.
    pub fn select_currency_code(&self, panel: Panel, code: &str) -> ConverterResult<()> {
        let currency = catalog::resolve(code)?;
        self.coordinator.select_currency(panel, currency);
        Ok(())
    }

    pub fn swap_currencies(&self) {
        self.coordinator.swap_currencies();
    }

    /// Calculator state.
    pub fn calculator(&self) -> &CalculatorState {
        self.calculator.state()
    }

    /// Current display string.
    pub fn display(&self) -> &str {
        self.calculator.display()
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &ConversionCoordinator {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use fxcalc_common::{CommonError, CurrencyPair};
    use fxcalc_fx::MockRateProvider;
    use std::sync::Arc;

    fn session() -> ConverterSession {
        let provider = Arc::new(MockRateProvider::new("mock"));
        provider.set_rate(CurrencyPair::new(Currency::usd(), Currency::eur()), 0.5);
        ConverterSession::new(ConversionCoordinator::new(
            ConverterConfig::default(),
            provider,
        ))
    }

    #[tokio::test]
    async fn test_digits_flow_into_active_amount() {
        let mut session = session();
        session.coordinator().refresh_rate();
        session.coordinator().settled().await;

        let outcome = session.press_sequence("12").unwrap();
        assert_eq!(outcome.result, Some(12.0));
        assert_eq!(outcome.display, "12");
        assert_eq!(session.coordinator().base_amount(), 12.0);
        assert_eq!(session.coordinator().target_amount(), 6.0);
    }

    #[tokio::test]
    async fn test_operator_without_result_leaves_amounts() {
        let mut session = session();
        session.press_sequence("8").unwrap();

        let outcome = session.press_sequence("+").unwrap();
        assert_eq!(outcome.result, None);
        assert_eq!(session.coordinator().base_amount(), 8.0);

        session.press_sequence("2=").unwrap();
        assert_eq!(session.coordinator().base_amount(), 10.0);
    }

    #[tokio::test]
    async fn test_division_by_zero_does_not_touch_amounts() {
        let mut session = session();
        session.press_sequence("9÷").unwrap();
        // The digit 0 itself is a result and is applied.
        session.press_sequence("0").unwrap();
        assert_eq!(session.coordinator().base_amount(), 0.0);

        let outcome = session.press_sequence("=").unwrap();
        assert_eq!(outcome.display, "Error");
        assert_eq!(outcome.result, None);
        assert_eq!(session.coordinator().base_amount(), 0.0);
    }

    #[tokio::test]
    async fn test_bad_sequence_presses_nothing() {
        let mut session = session();
        assert!(matches!(
            session.press_sequence("12?"),
            Err(ConverterError::Keypad(_))
        ));
        assert_eq!(session.display(), "0");
        assert_eq!(session.coordinator().base_amount(), 1.0);
    }

    #[tokio::test]
    async fn test_select_currency_code_validates() {
        let session = session();
        assert!(matches!(
            session.select_currency_code(Panel::Target, "EURO"),
            Err(ConverterError::Currency(_))
        ));
        assert!(!session.coordinator().is_fetching());

        let unknown = session
            .select_currency_code(Panel::Target, "XYZ")
            .unwrap_err();
        assert!(matches!(
            unknown,
            ConverterError::Currency(CommonError::UnknownCurrency(_))
        ));
        assert_eq!(unknown.error_code(), "UNKNOWN_CURRENCY");
        assert!(!session.coordinator().is_fetching());

        session.select_currency_code(Panel::Target, " eur ").unwrap();
        session.coordinator().settled().await;
        assert_eq!(session.coordinator().target_currency(), Currency::eur());
    }

    #[tokio::test]
    async fn test_toggle_active_panel_routes_keys() {
        let mut session = session();
        session.coordinator().refresh_rate();
        session.coordinator().settled().await;

        assert_eq!(session.toggle_active_panel(), Panel::Target);
        session.press_sequence("C3").unwrap();
        assert_eq!(session.coordinator().target_amount(), 3.0);
        assert_eq!(session.coordinator().base_amount(), 6.0);

        assert_eq!(session.toggle_active_panel(), Panel::Base);
        session.press_sequence("C4").unwrap();
        assert_eq!(session.coordinator().base_amount(), 4.0);
        assert_eq!(session.coordinator().target_amount(), 2.0);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = ConverterConfig {
            base_currency: Currency::new("DOLLAR"),
            ..Default::default()
        };
        assert!(matches!(
            ConverterSession::from_config(config),
            Err(ConverterError::Configuration(_))
        ));
    }
}
