//! Converter error types.

use fxcalc_calculator::CalculatorError;
use fxcalc_common::CommonError;
use thiserror::Error;

/// Errors raised while parsing converter input or building a session.
#[derive(Debug, Clone, Error)]
pub enum ConverterError {
    /// Panel name is neither `base` nor `target`.
    #[error("Unknown panel: {0}")]
    UnknownPanel(String),

    /// Currency code could not be used.
    #[error(transparent)]
    Currency(#[from] CommonError),

    /// Keypad input could not be parsed.
    #[error(transparent)]
    Keypad(#[from] CalculatorError),

    /// Configuration failed validation.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ConverterError {
    /// Stable code for log and CLI output.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConverterError::UnknownPanel(_) => "UNKNOWN_PANEL",
            ConverterError::Currency(e) => e.error_code(),
            ConverterError::Keypad(_) => "INVALID_KEY",
            ConverterError::Configuration(_) => "CONFIGURATION",
        }
    }
}

/// Result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;
