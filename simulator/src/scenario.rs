//! Simulation scenarios.

use std::path::Path;

use fxcalc_converter::Panel;
use serde::{Deserialize, Serialize};

/// A scripted converter session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Press a key sequence such as `"C12.5×4="`.
    Press { keys: String },
    /// Select the currency for a panel.
    SelectCurrency { panel: Panel, currency: String },
    /// Swap currencies and amounts.
    Swap,
    /// Choose which panel the keypad edits.
    SetActivePanel { panel: Panel },
    /// Hand the keypad to the other panel.
    TogglePanel,
    /// Refetch the rate for the current pair.
    Refresh,
    /// Wait until the latest fetch has resolved.
    Settle,
    /// Check the target amount.
    AssertTargetAmount { expected: f64, tolerance: f64 },
    /// Check the calculator display.
    AssertDisplay { expected: String },
}

impl ScenarioStep {
    /// Parse one line of interactive input.
    ///
    /// Recognized commands are `swap`, `refresh`, `settle`,
    /// `base <code>`, `target <code>` and `panel [base|target]`; a bare
    /// `panel` switches to the other panel. Anything else is treated as
    /// keypad input.
    pub fn parse_command(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();
        let extra = words.next().is_some();

        let step = match (command.as_str(), argument) {
            ("swap" | "refresh" | "settle" | "base" | "target" | "panel", _) if extra => {
                anyhow::bail!("Too many arguments: {}", line)
            }
            ("swap", None) => Self::Swap,
            ("refresh", None) => Self::Refresh,
            ("settle", None) => Self::Settle,
            ("base", Some(code)) => Self::SelectCurrency {
                panel: Panel::Base,
                currency: code.to_string(),
            },
            ("target", Some(code)) => Self::SelectCurrency {
                panel: Panel::Target,
                currency: code.to_string(),
            },
            ("panel", Some(panel)) => Self::SetActivePanel {
                panel: panel.parse()?,
            },
            ("panel", None) => Self::TogglePanel,
            _ => Self::Press {
                keys: line.to_string(),
            },
        };
        Ok(step)
    }
}

impl Scenario {
    /// Load a built-in scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "basic-conversion" => Ok(Self::basic_conversion()),
            "swap-roundtrip" => Ok(Self::swap_roundtrip()),
            "rapid-selection" => Ok(Self::rapid_selection()),
            "divide-by-zero" => Ok(Self::divide_by_zero()),
            _ => Err(anyhow::anyhow!(
                "Unknown scenario: {} (available: {})",
                name,
                Self::builtin_names().join(", ")
            )),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Names of the built-in scenarios.
    pub fn builtin_names() -> &'static [&'static str] {
        &[
            "basic-conversion",
            "swap-roundtrip",
            "rapid-selection",
            "divide-by-zero",
        ]
    }

    /// Type an amount on the base panel and read the converted target.
    fn basic_conversion() -> Self {
        Self {
            name: "basic-conversion".to_string(),
            description: "Type 100 USD and convert to EUR".to_string(),
            steps: vec![
                ScenarioStep::SelectCurrency {
                    panel: Panel::Base,
                    currency: "USD".to_string(),
                },
                ScenarioStep::SelectCurrency {
                    panel: Panel::Target,
                    currency: "EUR".to_string(),
                },
                ScenarioStep::Settle,
                ScenarioStep::Press {
                    keys: "C100".to_string(),
                },
                ScenarioStep::AssertTargetAmount {
                    expected: 85.0,
                    tolerance: 1e-9,
                },
                ScenarioStep::Press {
                    keys: "×2=".to_string(),
                },
                ScenarioStep::AssertDisplay {
                    expected: "200".to_string(),
                },
                ScenarioStep::AssertTargetAmount {
                    expected: 170.0,
                    tolerance: 1e-9,
                },
            ],
        }
    }

    /// Swap twice; each swap recomputes from the active base amount.
    fn swap_roundtrip() -> Self {
        Self {
            name: "swap-roundtrip".to_string(),
            description: "Swap USD/EUR and back, recomputing after each fetch".to_string(),
            steps: vec![
                ScenarioStep::SelectCurrency {
                    panel: Panel::Base,
                    currency: "USD".to_string(),
                },
                ScenarioStep::SelectCurrency {
                    panel: Panel::Target,
                    currency: "EUR".to_string(),
                },
                ScenarioStep::Settle,
                ScenarioStep::Press {
                    keys: "C100".to_string(),
                },
                ScenarioStep::Swap,
                // EUR 85 drives the EUR/USD fixture rate of 1.18.
                ScenarioStep::Settle,
                ScenarioStep::AssertTargetAmount {
                    expected: 100.3,
                    tolerance: 1e-6,
                },
                ScenarioStep::Swap,
                ScenarioStep::Settle,
                ScenarioStep::AssertTargetAmount {
                    expected: 85.255,
                    tolerance: 1e-6,
                },
            ],
        }
    }

    /// Select several targets in quick succession; only the last one lands.
    fn rapid_selection() -> Self {
        let mut steps = vec![
            ScenarioStep::SelectCurrency {
                panel: Panel::Base,
                currency: "USD".to_string(),
            },
            ScenarioStep::Settle,
            ScenarioStep::Press {
                keys: "C50".to_string(),
            },
        ];
        for code in ["GBP", "JPY", "CAD", "CHF"] {
            steps.push(ScenarioStep::SelectCurrency {
                panel: Panel::Target,
                currency: code.to_string(),
            });
        }
        steps.push(ScenarioStep::Settle);
        steps.push(ScenarioStep::AssertTargetAmount {
            expected: 44.0,
            tolerance: 1e-9,
        });

        Self {
            name: "rapid-selection".to_string(),
            description: "Superseded rate fetches are discarded".to_string(),
            steps,
        }
    }

    /// A failed evaluation shows the error marker and leaves amounts alone.
    fn divide_by_zero() -> Self {
        Self {
            name: "divide-by-zero".to_string(),
            description: "Division by zero leaves both amounts untouched".to_string(),
            steps: vec![
                ScenarioStep::SelectCurrency {
                    panel: Panel::Target,
                    currency: "EUR".to_string(),
                },
                ScenarioStep::Settle,
                ScenarioStep::SetActivePanel {
                    panel: Panel::Target,
                },
                ScenarioStep::Press {
                    keys: "C17÷".to_string(),
                },
                ScenarioStep::AssertTargetAmount {
                    expected: 17.0,
                    tolerance: 0.0,
                },
                // The 0 digit is itself written to the target amount.
                ScenarioStep::Press {
                    keys: "0=".to_string(),
                },
                ScenarioStep::AssertDisplay {
                    expected: "Error".to_string(),
                },
                ScenarioStep::AssertTargetAmount {
                    expected: 0.0,
                    tolerance: 0.0,
                },
                ScenarioStep::Press {
                    keys: "+".to_string(),
                },
                ScenarioStep::AssertDisplay {
                    expected: "Error".to_string(),
                },
            ],
        }
    }
}
