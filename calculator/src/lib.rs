//! FxCalc Calculator Engine
//!
//! A four-function keypad calculator modelled as a pure state machine.
//! Every key press maps `(state, key)` to `(state', result)`, where the result
//! is the numeric value the keypad produced (if any) and is what the
//! conversion layer applies to the active amount.
//!
//! Evaluation is strictly left to right: `10 + 5 × 2 =` yields `30`.
//!
//! # Example
//!
//! ```rust
//! use fxcalc_calculator::{Calculator, Key};
//!
//! let mut calc = Calculator::new();
//! let mut result = None;
//! for key in Key::parse_sequence("7+3=").unwrap() {
//!     result = calc.press(key);
//! }
//! assert_eq!(result, Some(10.0));
//! assert_eq!(calc.display(), "10");
//! ```

pub mod error;
pub mod key;
pub mod state;

pub use error::{CalculatorError, CalculatorResult};
pub use key::{Digit, Key, Operation};
pub use state::{format_number, process_key, Calculator, CalculatorState, ERROR_DISPLAY};
