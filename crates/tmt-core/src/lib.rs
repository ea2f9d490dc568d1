//! Configuration, clustering, and orchestration for the TMT attachment
//! simulation.
//!
//! This crate owns the end-of-iteration population-dynamics pass and the
//! sequential loop that drives it: movement turns, then clustering,
//! mortality, decisions, the elimination quota, network evolution, the
//! wellbeing-check exchange, aging, and reproduction.
//!
//! # Modules
//!
//! - [`clustering`] -- Spatial k-means over living agents.
//! - [`config`] -- Configuration loading from `tmt-config.yaml` into
//!   strongly-typed, validated structs.
//! - [`movement`] -- The per-turn movement phase.
//! - [`population`] -- The [`PopulationEngine`] and its hook contract.
//! - [`runner`] -- [`run_simulation`] and the [`IterationCallback`] trait.
//!
//! [`PopulationEngine`]: population::PopulationEngine
//! [`run_simulation`]: runner::run_simulation
//! [`IterationCallback`]: runner::IterationCallback

pub mod clustering;
pub mod config;
pub mod movement;
pub mod population;
pub mod runner;
