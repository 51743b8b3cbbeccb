//! Calculator state and the key-press transition function.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalculatorError;
use crate::key::{Digit, Key, Operation};

/// Display marker shown after a failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

/// Keypad calculator state.
///
/// `display` is never empty. It holds either a decimal literal matching
/// `^-?\d*\.?\d*$` or [`ERROR_DISPLAY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorState {
    /// Number being typed or shown.
    pub display: String,
    /// Left operand of the pending operation.
    pub previous_value: Option<f64>,
    /// Operation waiting for its right operand.
    pub pending_operation: Option<Operation>,
    /// Next digit starts a fresh number instead of extending `display`.
    pub awaiting_new_operand: bool,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            previous_value: None,
            pending_operation: None,
            awaiting_new_operand: false,
        }
    }
}

impl CalculatorState {
    /// Create a state with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the display shows the error marker.
    pub fn is_error(&self) -> bool {
        self.display == ERROR_DISPLAY
    }

    /// Numeric value of the display, `None` for the error marker.
    pub fn display_value(&self) -> Option<f64> {
        if self.is_error() {
            return None;
        }
        self.display.parse::<f64>().ok()
    }

    /// Apply a key, returning the successor state and the produced value.
    pub fn process_key(&self, key: Key) -> (Self, Option<f64>) {
        let mut next = self.clone();
        let result = next.apply_key(key);
        (next, result)
    }

    fn apply_key(&mut self, key: Key) -> Option<f64> {
        match key {
            Key::Digit(digit) => self.input_digit(digit),
            Key::Decimal => {
                self.input_decimal();
                None
            }
            Key::Operator(op) => self.input_operator(op),
            Key::Equals => self.evaluate(),
            Key::Clear => {
                *self = Self::default();
                Some(0.0)
            }
            Key::Backspace => self.backspace(),
        }
    }

    fn input_digit(&mut self, digit: Digit) -> Option<f64> {
        let c = digit.as_char();
        if self.awaiting_new_operand {
            self.display = c.to_string();
            self.awaiting_new_operand = false;
        } else if self.display == "0" {
            self.display = c.to_string();
        } else {
            self.display.push(c);
        }
        self.display_value()
    }

    fn input_decimal(&mut self) {
        if self.awaiting_new_operand {
            self.display = "0.".to_string();
            self.awaiting_new_operand = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    fn input_operator(&mut self, op: Operation) -> Option<f64> {
        // The error marker is not an operand.
        let current = self.display_value()?;

        let mut result = None;
        match (self.previous_value, self.pending_operation) {
            (None, _) => self.previous_value = Some(current),
            (Some(previous), Some(pending)) => match pending.apply(previous, current) {
                Ok(value) => {
                    self.display = format_number(value);
                    self.previous_value = Some(value);
                    result = Some(value);
                }
                Err(e) => {
                    self.enter_error(e);
                    return None;
                }
            },
            (Some(_), None) => {}
        }

        self.pending_operation = Some(op);
        self.awaiting_new_operand = true;
        result
    }

    fn evaluate(&mut self) -> Option<f64> {
        let (previous, pending) = match (self.previous_value, self.pending_operation) {
            (Some(previous), Some(pending)) => (previous, pending),
            _ => return None,
        };
        let current = self.display_value()?;

        match pending.apply(previous, current) {
            Ok(value) => {
                self.display = format_number(value);
                self.previous_value = None;
                self.pending_operation = None;
                self.awaiting_new_operand = true;
                Some(value)
            }
            Err(e) => {
                self.enter_error(e);
                None
            }
        }
    }

    fn backspace(&mut self) -> Option<f64> {
        if self.is_error() || self.display.len() <= 1 {
            self.display = "0".to_string();
        } else {
            self.display.pop();
            if self.display == "-" {
                self.display = "0".to_string();
            }
        }
        self.display_value()
    }

    fn enter_error(&mut self, error: CalculatorError) {
        debug!(error = %error, "Calculator entered error state");
        self.display = ERROR_DISPLAY.to_string();
        self.previous_value = None;
        self.pending_operation = None;
        self.awaiting_new_operand = true;
    }
}

/// Pure transition: `(state, key) -> (state', result)`.
pub fn process_key(state: &CalculatorState, key: Key) -> (CalculatorState, Option<f64>) {
    state.process_key(key)
}

/// Render a value for the display.
///
/// Uses the shortest round-trip decimal form; negative zero renders as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Owns a [`CalculatorState`] and advances it one key at a time.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    state: CalculatorState,
}

impl Calculator {
    /// Create a calculator in the default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Press a key.
    pub fn press(&mut self, key: Key) -> Option<f64> {
        let (next, result) = self.state.process_key(key);
        self.state = next;
        result
    }

    /// Press each key in turn, returning the result of the last one.
    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) -> Option<f64> {
        keys.into_iter().fold(None, |_, key| self.press(key))
    }

    /// Current display string.
    pub fn display(&self) -> &str {
        &self.state.display
    }

    /// Current state.
    pub fn state(&self) -> &CalculatorState {
        &self.state
    }
}
