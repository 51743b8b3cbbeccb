//! Simulation controller.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{info, warn};

use fxcalc_calculator::Key;
use fxcalc_common::format_amount;
use fxcalc_converter::{ConverterConfig, ConverterError, ConverterSession};

use crate::metrics::SimulationMetrics;
use crate::scenario::{Scenario, ScenarioStep};

/// Drives a converter session from scenarios, key strings or stdin.
pub struct SimulationController {
    session: ConverterSession,
    metrics: SimulationMetrics,
}

impl SimulationController {
    /// Create a controller around a fixture-backed session.
    pub fn new(config: ConverterConfig) -> anyhow::Result<Self> {
        Ok(Self {
            session: ConverterSession::from_config(config)?,
            metrics: SimulationMetrics::new(),
        })
    }

    /// Fetch the initial rate and wait for it.
    pub async fn initialize(&mut self) -> anyhow::Result<()> {
        info!(
            provider = self.session.coordinator().provider_name(),
            "Fetching initial rate"
        );
        self.session.coordinator().refresh_rate();
        self.settle().await;
        Ok(())
    }

    /// Run a scenario, stopping at the first failed step.
    pub async fn run_scenario(&mut self, scenario: Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        for (index, step) in scenario.steps.iter().enumerate() {
            self.execute_step(step)
                .await
                .map_err(|e| anyhow::anyhow!("Step {} ({:?}) failed: {}", index + 1, step, e))?;
        }

        Ok(())
    }

    /// Press a key string and wait for any fetch it implies.
    pub async fn run_keys(&mut self, keys: &str) -> anyhow::Result<()> {
        self.execute_step(&ScenarioStep::Press {
            keys: keys.to_string(),
        })
        .await?;
        self.settle().await;
        Ok(())
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run_interactive(&mut self) -> anyhow::Result<()> {
        info!("Commands: base <code>, target <code>, panel [base|target], swap, refresh, quit");
        info!("Any other input is pressed on the keypad");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "quit" | "exit") {
                break;
            }

            let outcome = match ScenarioStep::parse_command(line) {
                Ok(step) => self.execute_step(&step).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => {
                    // Keep the view in step with any fetch the command issued.
                    self.settle().await;
                    self.log_state();
                }
                Err(e) => warn!(code = rejection_code(&e), error = %e, "Command rejected"),
            }
        }

        Ok(())
    }

    /// Execute a single scenario step.
    async fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        self.metrics.record_step();

        match step {
            ScenarioStep::Press { keys } => {
                // Parse everything up front so a typo presses nothing.
                let keys = Key::parse_sequence(keys)?;
                for key in keys {
                    let outcome = self.session.press(key);
                    self.metrics.record_key(outcome.result.is_some());
                }
                info!(display = self.session.display(), "Pressed keys");
            }
            ScenarioStep::SelectCurrency { panel, currency } => {
                self.session.select_currency_code(*panel, currency)?;
            }
            ScenarioStep::Swap => self.session.swap_currencies(),
            ScenarioStep::SetActivePanel { panel } => self.session.set_active_panel(*panel),
            ScenarioStep::TogglePanel => {
                let panel = self.session.toggle_active_panel();
                info!(%panel, "Keypad now edits");
            }
            ScenarioStep::Refresh => self.session.coordinator().refresh_rate(),
            ScenarioStep::Settle => self.settle().await,
            ScenarioStep::AssertTargetAmount {
                expected,
                tolerance,
            } => {
                let actual = self.session.coordinator().target_amount();
                let passed = (actual - expected).abs() <= *tolerance;
                self.metrics.record_assertion(passed);
                if !passed {
                    anyhow::bail!("Expected target amount {}, got {}", expected, actual);
                }
            }
            ScenarioStep::AssertDisplay { expected } => {
                let actual = self.session.display();
                let passed = actual == expected;
                self.metrics.record_assertion(passed);
                if !passed {
                    anyhow::bail!("Expected display {:?}, got {:?}", expected, actual);
                }
            }
        }

        Ok(())
    }

    async fn settle(&mut self) {
        let started = Instant::now();
        self.session.coordinator().settled().await;
        self.metrics.record_settle(started.elapsed());
    }

    /// Log the current conversion view.
    pub fn log_state(&self) {
        let snapshot = self.session.coordinator().snapshot();
        let conversion = &snapshot.conversion;
        let rate = snapshot
            .rate
            .as_ref()
            .map(|r| {
                format!(
                    "{} ({}, {}, {}s old)",
                    r,
                    r.source,
                    r.fetched_at_label(),
                    r.age().num_seconds()
                )
            })
            .unwrap_or_else(|| "unavailable".to_string());

        info!(
            "{} {} | {} {} | active: {} | display: {} | rate: {}{}",
            conversion.base_currency,
            format_amount(&conversion.base_currency, conversion.base_amount),
            conversion.target_currency,
            format_amount(&conversion.target_currency, conversion.target_amount),
            conversion.active_panel,
            self.session.display(),
            rate,
            if snapshot.is_stale { " (stale)" } else { "" }
        );
    }

    /// The session being driven.
    pub fn session(&self) -> &ConverterSession {
        &self.session
    }

    /// Get simulation metrics.
    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }
}

/// Error code for a rejected command, when the converter raised it.
fn rejection_code(error: &anyhow::Error) -> &'static str {
    error
        .downcast_ref::<ConverterError>()
        .map(ConverterError::error_code)
        .unwrap_or("INVALID_COMMAND")
}
