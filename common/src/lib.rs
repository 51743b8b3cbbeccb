//! FxCalc Common Types
//!
//! This crate contains shared types used across the FxCalc workspace,
//! including currency codes, currency pairs, the currency catalog and
//! time helpers.

pub mod catalog;
pub mod currency;
pub mod error;
pub mod time;

pub use catalog::*;
pub use currency::*;
pub use error::*;
pub use time::*;
