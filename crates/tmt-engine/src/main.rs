//! Simulation binary for the TMT attachment model.
//!
//! This is the host orchestrator: it loads configuration, seeds the
//! population, and drives the iteration loop until the iteration budget is
//! spent or the population dies out.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `tmt-config.yaml` (or `$TMT_CONFIG`)
//! 3. Build the population engine and seed the initial agents
//! 4. Run the simulation loop
//! 5. Log the result

mod error;
mod log_callback;

use std::path::PathBuf;

use tmt_core::config::SimulationConfig;
use tmt_core::population::PopulationEngine;
use tmt_core::runner;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LogCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "tmt-config.yaml";

/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "TMT_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, seeding fails, or the
/// simulation itself fails.
fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("tmt-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        iterations = config.world.iterations,
        turns = config.world.turns,
        agents = config.population.initial_agents,
        k = config.clustering.k,
        rho = config.population.rho,
        threshold = config.decision.threshold,
        "Configuration loaded"
    );

    // 3. Build and seed the engine.
    let mut engine = PopulationEngine::new(config)?;
    engine.initialize()?;

    // 4. Run.
    let mut callback = LogCallback::new();
    let result = runner::run_simulation(&mut engine, &mut callback)?;

    // 5. Report.
    runner::log_simulation_end(&result);
    info!(
        peak_population = callback.peak_population(),
        total_spawned = callback.total_spawned(),
        "tmt-engine finished"
    );
    Ok(())
}

/// Load the simulation configuration.
///
/// `$TMT_CONFIG` names the file when set. Otherwise `tmt-config.yaml` in
/// the working directory is used if present, and defaults if not.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || config_path.exists() {
        info!(path = %config_path.display(), "Loading configuration");
        let config = SimulationConfig::from_file(&config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
