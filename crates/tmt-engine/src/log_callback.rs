//! Iteration callback that reports progress through `tracing`.
//!
//! Each summary is logged at `info`; per-agent snapshots and decision
//! diagnostics go out at `debug` so they stay silent under the default
//! filter.

use tmt_core::population::PopulationEngine;
use tmt_core::runner::IterationCallback;
use tmt_types::{AspDecision, IterationSummary};
use tracing::{debug, info};

/// Callback that logs each iteration.
#[derive(Debug, Default)]
pub struct LogCallback {
    peak_population: u32,
    total_spawned: usize,
}

impl LogCallback {
    /// Create a new logging callback.
    pub const fn new() -> Self {
        Self {
            peak_population: 0,
            total_spawned: 0,
        }
    }

    /// Largest population seen at the end of any iteration.
    pub const fn peak_population(&self) -> u32 {
        self.peak_population
    }

    /// Children spawned over the whole run.
    pub const fn total_spawned(&self) -> usize {
        self.total_spawned
    }
}

impl IterationCallback for LogCallback {
    fn on_turn(&mut self, iteration: u32, turn: u32, engine: &PopulationEngine) {
        for snapshot in engine.snapshots() {
            debug!(
                iteration,
                turn,
                agent_id = %snapshot.id,
                style = %snapshot.style,
                age = snapshot.age,
                cluster = ?snapshot.cluster_id,
                position = %snapshot.position,
                heroism = snapshot.heroism,
                "Agent snapshot"
            );
        }
    }

    fn on_iteration(&mut self, summary: &IterationSummary, _engine: &PopulationEngine) {
        self.peak_population = self.peak_population.max(summary.population_after);
        self.total_spawned = self.total_spawned.saturating_add(summary.spawned.len());

        let inaction = summary
            .diagnostics
            .iter()
            .filter(|d| d.decision == AspDecision::Inaction)
            .count();
        info!(
            iteration = summary.iteration,
            population = summary.population_after,
            natural_deaths = summary.natural_deaths.len(),
            volunteers = summary.volunteers,
            inaction,
            required = summary.required_eliminations,
            self_sacrificed = summary.self_sacrificed.len(),
            eliminated = summary.eliminated.len(),
            spawned = summary.spawned.len(),
            expected_children = summary.expected_children,
            "Iteration complete"
        );
        for d in &summary.diagnostics {
            debug!(
                iteration = summary.iteration,
                agent_id = %d.agent_id,
                mortality_salience = d.mortality_salience,
                worldview_validation = d.worldview_validation,
                relationship_validation = d.relationship_validation,
                confidence = d.confidence,
                decision = ?d.decision,
                "Decision diagnostic"
            );
        }
    }
}
