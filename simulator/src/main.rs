//! FxCalc Simulator
//!
//! Drives a keypad converter session from the command line, from built-in
//! scenarios, or interactively from stdin.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxcalc_common::{catalog, Currency};
use fxcalc_converter::ConverterConfig;

mod controller;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::Scenario;

/// FxCalc Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "fxcalc-sim")]
#[command(about = "Keypad currency converter simulator")]
struct Args {
    /// Base currency code
    #[arg(long)]
    base: Option<String>,

    /// Target currency code
    #[arg(long)]
    target: Option<String>,

    /// Key sequence to press, e.g. "12.5×4="
    #[arg(short, long)]
    keys: Option<String>,

    /// Built-in scenario to run
    #[arg(short, long, conflicts_with = "scenario_file")]
    scenario: Option<String>,

    /// Scenario to load from a JSON file
    #[arg(long)]
    scenario_file: Option<PathBuf>,

    /// Random seed for reproducible latency and synthetic rates
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum simulated fetch latency
    #[arg(long)]
    min_latency_ms: Option<u64>,

    /// Maximum simulated fetch latency
    #[arg(long)]
    max_latency_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Layer command-line overrides on top of the environment.
    fn into_config(self, mut config: ConverterConfig) -> anyhow::Result<ConverterConfig> {
        if let Some(code) = &self.base {
            config.base_currency = resolve_flag("base", code)?;
        }
        if let Some(code) = &self.target {
            config.target_currency = resolve_flag("target", code)?;
        }
        if let Some(seed) = self.seed {
            config.fixture.seed = Some(seed);
        }
        if let Some(ms) = self.min_latency_ms {
            config.fixture.min_latency = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_latency_ms {
            config.fixture.max_latency = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

fn resolve_flag(flag: &str, code: &str) -> anyhow::Result<Currency> {
    catalog::resolve(code).map_err(|e| {
        error!(flag, code = e.error_code(), "Currency rejected: {}", e);
        anyhow::anyhow!("--{} {}: {}", flag, code, e)
    })
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!("Starting FxCalc Simulator");

    let keys = args.keys.clone();
    let scenario = match (&args.scenario, &args.scenario_file) {
        (Some(name), _) => Some(Scenario::load(name)?),
        (None, Some(path)) => Some(Scenario::from_file(path)?),
        (None, None) => None,
    };
    let interactive = keys.is_none() && scenario.is_none();
    let config = args.into_config(ConverterConfig::from_env())?;

    info!(
        base = %config.base_currency,
        target = %config.target_currency,
        fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
        "Converter configured"
    );

    let mut controller = SimulationController::new(config)?;
    controller.initialize().await?;

    if let Some(scenario) = scenario {
        controller.run_scenario(scenario).await?;
    }

    if let Some(keys) = &keys {
        controller.run_keys(keys).await?;
    }

    if interactive {
        info!("Running in interactive mode");
        info!("Press Ctrl+D to stop");
        controller.run_interactive().await?;
    }

    controller.log_state();

    // Print metrics
    let converter = controller.session().coordinator().metrics();
    let metrics = controller.metrics();
    info!("Simulation complete");
    info!(
        "Fetches: {} issued, {} applied, {} discarded, {} failed",
        converter.fetches_issued,
        converter.fetches_applied,
        converter.fetches_discarded,
        converter.fetches_failed
    );
    info!("Keys pressed: {}", metrics.keys_pressed);
    info!(
        "Assertions: {} passed, {} failed",
        metrics.assertions_passed, metrics.assertions_failed
    );
    info!(
        "Settle wait: {}ms average, {}ms max",
        metrics.average_settle_ms(),
        metrics.max_settle_ms()
    );

    Ok(())
}
