//! Keypad keys and arithmetic operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalculatorError, CalculatorResult};

/// A single decimal digit, 0 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// Create a digit, rejecting values above 9.
    pub fn new(value: u8) -> CalculatorResult<Self> {
        if value > 9 {
            return Err(CalculatorError::InvalidDigit(value));
        }
        Ok(Self(value))
    }

    /// Numeric value of the digit.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The digit as an ASCII character.
    pub fn as_char(&self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = CalculatorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

/// Binary arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Keypad symbol for the operation.
    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
        }
    }

    /// Evaluate `lhs <op> rhs`.
    ///
    /// Fails on division by zero, and on results that leave the finite
    /// range of f64.
    pub fn apply(&self, lhs: f64, rhs: f64) -> CalculatorResult<f64> {
        let result = match self {
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => {
                if rhs == 0.0 {
                    return Err(CalculatorError::DivisionByZero);
                }
                lhs / rhs
            }
        };

        if !result.is_finite() {
            return Err(CalculatorError::Overflow);
        }
        Ok(result)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A key event emitted by the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Digit(Digit),
    Decimal,
    Operator(Operation),
    Equals,
    Clear,
    Backspace,
}

impl Key {
    /// Digit key for `value`.
    pub fn digit(value: u8) -> CalculatorResult<Self> {
        Ok(Key::Digit(Digit::new(value)?))
    }

    /// Parse a compact key string such as `"10+5×2="`.
    ///
    /// Whitespace is skipped. `*`/`x` and `/` are accepted as aliases for
    /// `×` and `÷`; `C` clears and `⌫` or `<` is backspace.
    pub fn parse_sequence(input: &str) -> CalculatorResult<Vec<Key>> {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Key::try_from)
            .collect()
    }

    /// Keypad label for the key.
    pub fn label(&self) -> String {
        match self {
            Key::Digit(d) => d.as_char().to_string(),
            Key::Decimal => ".".to_string(),
            Key::Operator(op) => op.symbol().to_string(),
            Key::Equals => "=".to_string(),
            Key::Clear => "C".to_string(),
            Key::Backspace => "⌫".to_string(),
        }
    }
}

impl TryFrom<char> for Key {
    type Error = CalculatorError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let key = match c {
            '0'..='9' => Key::Digit(Digit(c as u8 - b'0')),
            '.' | ',' => Key::Decimal,
            '+' => Key::Operator(Operation::Add),
            '-' | '−' => Key::Operator(Operation::Subtract),
            '×' | '*' | 'x' | 'X' => Key::Operator(Operation::Multiply),
            '÷' | '/' => Key::Operator(Operation::Divide),
            '=' => Key::Equals,
            'C' | 'c' => Key::Clear,
            '⌫' | '<' | '\u{8}' => Key::Backspace,
            other => return Err(CalculatorError::UnknownKey(other)),
        };
        Ok(key)
    }
}

impl FromStr for Key {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::try_from(c),
            (Some(c), Some(_)) => Err(CalculatorError::UnknownKey(c)),
            (None, _) => Err(CalculatorError::UnknownKey(' ')),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_bounds() {
        assert_eq!(Digit::new(9).unwrap().as_char(), '9');
        assert_eq!(Digit::new(10), Err(CalculatorError::InvalidDigit(10)));
    }

    #[test]
    fn test_parse_sequence_aliases() {
        let keys = Key::parse_sequence("1 * 2 / 3 x 4 ÷ 5 ×").unwrap();
        let ops: Vec<_> = keys
            .iter()
            .filter_map(|k| match k {
                Key::Operator(op) => Some(*op),
                _ => None,
            })
            .collect();

        assert_eq!(
            ops,
            vec![
                Operation::Multiply,
                Operation::Divide,
                Operation::Multiply,
                Operation::Divide,
                Operation::Multiply,
            ]
        );
    }

    #[test]
    fn test_parse_sequence_rejects_unknown() {
        assert_eq!(
            Key::parse_sequence("1+?"),
            Err(CalculatorError::UnknownKey('?'))
        );
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("C".parse::<Key>().unwrap(), Key::Clear);
        assert_eq!("⌫".parse::<Key>().unwrap(), Key::Backspace);
        assert!("12".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_operation_apply() {
        assert_eq!(Operation::Add.apply(7.0, 3.0), Ok(10.0));
        assert_eq!(Operation::Subtract.apply(20.0, 8.0), Ok(12.0));
        assert_eq!(Operation::Multiply.apply(8.0, 9.0), Ok(72.0));
        assert_eq!(Operation::Divide.apply(56.0, 8.0), Ok(7.0));
        assert_eq!(
            Operation::Divide.apply(1.0, 0.0),
            Err(CalculatorError::DivisionByZero)
        );
        assert_eq!(
            Operation::Multiply.apply(f64::MAX, 2.0),
            Err(CalculatorError::Overflow)
        );
    }

    #[test]
    fn test_key_serde() {
        let key = Key::digit(4).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"digit":4}"#);
        assert_eq!(serde_json::from_str::<Key>(&json).unwrap(), key);

        assert!(serde_json::from_str::<Key>(r#"{"digit":11}"#).is_err());
        assert_eq!(
            serde_json::from_str::<Key>(r#"{"operator":"divide"}"#).unwrap(),
            Key::Operator(Operation::Divide)
        );
        assert_eq!(serde_json::from_str::<Key>(r#""clear""#).unwrap(), Key::Clear);
    }
}
