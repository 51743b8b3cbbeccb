//! Calculator error types.

use thiserror::Error;

/// Errors produced while evaluating or parsing keypad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    /// Right operand of a division was zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Result does not fit in a finite f64.
    #[error("Result overflowed")]
    Overflow,

    /// Character does not map to any keypad key.
    #[error("Unknown key: {0:?}")]
    UnknownKey(char),

    /// Digit value outside 0-9.
    #[error("Invalid digit: {0}")]
    InvalidDigit(u8),
}

/// Result type for calculator operations.
pub type CalculatorResult<T> = Result<T, CalculatorError>;
