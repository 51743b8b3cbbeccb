//! FxCalc Converter
//!
//! Keeps a base amount and a target amount synchronized through an
//! asynchronously fetched exchange rate, and lets a keypad calculator edit
//! whichever amount is active.
//!
//! # Example
//!
//! ```rust,ignore
//! use fxcalc_converter::{ConversionCoordinator, ConverterConfig, ConverterSession, Panel};
//!
//! let coordinator = ConversionCoordinator::with_fixture(ConverterConfig::default());
//! coordinator.refresh_rate();
//! let mut session = ConverterSession::new(coordinator);
//!
//! session.press_sequence("250")?;
//! session.coordinator().settled().await;
//! println!("{}", session.coordinator().target_amount());
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod session;
pub mod state;

pub use config::ConverterConfig;
pub use coordinator::ConversionCoordinator;
pub use error::{ConverterError, ConverterResult};
pub use metrics::{ConverterMetrics, MetricsSnapshot};
pub use session::{ConverterSession, KeyOutcome};
pub use state::{ConversionSnapshot, ConversionState, Panel};
