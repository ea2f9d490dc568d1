//! Sequential simulation loop.
//!
//! This module provides [`run_simulation`], the host scheduler that drives
//! a [`PopulationEngine`] through its hook contract:
//!
//! - **Bounded run**: `world.iterations` iterations of `world.turns`
//!   movement turns, each iteration closed by one population-dynamics pass
//! - **Extinction**: the run stops early once no agent is left alive
//! - **Observation**: an [`IterationCallback`] sees every turn and summary
//!
//! Iterations never overlap; one finishes before the next begins.

use tmt_types::IterationSummary;
use tracing::{info, warn};

use crate::population::{PopulationEngine, PopulationError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// An engine hook failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying engine error.
        #[from]
        source: PopulationError,
    },
}

/// Why a simulation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Every configured iteration ran.
    IterationsCompleted,
    /// The population died out.
    Extinction,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last iteration summary, if any iteration completed.
    pub final_summary: Option<IterationSummary>,
    /// Total number of iterations executed.
    pub total_iterations: u32,
}

/// Observer hooks invoked by [`run_simulation`].
///
/// Implementations typically record agent snapshots for export.
pub trait IterationCallback {
    /// Called after every movement turn.
    fn on_turn(&mut self, _iteration: u32, _turn: u32, _engine: &PopulationEngine) {}

    /// Called after each population-dynamics pass.
    fn on_iteration(&mut self, summary: &IterationSummary, engine: &PopulationEngine);
}

/// A callback that ignores everything.
pub struct NoOpCallback;

impl IterationCallback for NoOpCallback {
    fn on_iteration(&mut self, _summary: &IterationSummary, _engine: &PopulationEngine) {}
}

/// Run an initialized engine until its iteration budget is spent or the
/// population dies out.
///
/// # Errors
///
/// Returns [`RunnerError`] if an engine hook fails.
pub fn run_simulation(
    engine: &mut PopulationEngine,
    callback: &mut dyn IterationCallback,
) -> Result<SimulationResult, RunnerError> {
    let iterations = engine.config().world.iterations;
    let turns = engine.config().world.turns;
    let mut last_summary: Option<IterationSummary> = None;
    let mut total_iterations: u32 = 0;

    info!(
        iterations,
        turns,
        population = engine.population(),
        "Simulation starting"
    );

    while total_iterations < iterations {
        let iteration = engine.iteration();

        // --- Movement turns ---
        for turn in 0..turns {
            engine.run_movement_turn(turn)?;
            callback.on_turn(iteration, turn, engine);
        }

        // --- End-of-iteration pass ---
        let summary = engine.run_population_dynamics()?;
        total_iterations = total_iterations.saturating_add(1);
        callback.on_iteration(&summary, engine);

        // --- Check extinction ---
        if summary.population_after == 0 {
            info!(iteration, "No agents left alive -- extinction");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Extinction,
                final_summary: Some(summary),
                total_iterations,
            });
        }

        last_summary = Some(summary);
    }

    Ok(SimulationResult {
        end_reason: SimulationEndReason::IterationsCompleted,
        final_summary: last_summary,
        total_iterations,
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_iterations = result.total_iterations,
        final_iteration = result.final_summary.as_ref().map(|s| s.iteration),
        final_population = result.final_summary.as_ref().map(|s| s.population_after),
        "Simulation ended"
    );
    if let Some(ref summary) = result.final_summary {
        info!(
            iteration = summary.iteration,
            population = summary.population_after,
            temples = summary.temples.len(),
            tombstones = summary.tombstones.len(),
            expected_children = summary.expected_children,
            "Final iteration summary"
        );
    } else {
        warn!("Simulation ended with no iterations executed");
    }
}
