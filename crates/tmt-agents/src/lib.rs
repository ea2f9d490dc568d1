//! Agent state, decision model, social network, and inheritance for the TMT
//! attachment simulation.
//!
//! This crate is the logic layer for individual agents: everything that
//! operates on one agent (or one cluster's worth of agents) without
//! orchestrating an iteration. It builds on `tmt-types` (shared data) and
//! is driven by `tmt-core` (the population-dynamics engine), which also owns
//! the grid.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] record and the [`AgentRegistry`]
//! - [`attachment`] -- Style parameter bands, style draws, movement policies
//! - [`config`] -- Decision-model parameters ([`DecisionConfig`])
//! - [`decision`] -- Three-factor self-sacrifice adjudication
//! - [`error`] -- Error types ([`AgentError`])
//! - [`movement`] -- Per-style movement targets and the closest-friend query
//! - [`reproduction`] -- Pairing, fertility drift, and style inheritance
//! - [`social`] -- Weighted ties and estrangement accounting ([`SocialGraph`])
//! - [`telomere`] -- Age-dependent mortality ([`Telomere`])
//! - [`wellbeing`] -- The synchronous wellbeing-check protocol
//! - [`worldview`] -- Opinion ledger and alignment ([`Worldview`])
//! - [`ysterofimia`] -- Posthumous-esteem ledger ([`Ysterofimia`])

pub mod agent;
pub mod attachment;
pub mod config;
pub mod decision;
pub mod error;
pub mod movement;
pub mod reproduction;
pub mod social;
pub mod telomere;
pub mod wellbeing;
pub mod worldview;
pub mod ysterofimia;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentRegistry, AgentSeed, EliminationExposure};
pub use attachment::{Attachment, MovementPolicy, StyleDistribution, StyleProfile, WellbeingParams};
pub use config::{AspWeights, DecisionConfig};
pub use decision::{AspScores, DecisionContext, adjudicate};
pub use error::AgentError;
pub use movement::{closest_friend, cluster_mates, movement_target};
pub use reproduction::{
    FertilityBounds, adjust_expected_children, pair_parents, sample_child_count,
    sample_child_style,
};
pub use social::{SocialGraph, TieEvent, TieEvents};
pub use telomere::Telomere;
pub use wellbeing::{
    Envelope, WellbeingHandler, WellbeingMessage, WellbeingStats, deliver, run_wellbeing_round,
};
pub use worldview::Worldview;
pub use ysterofimia::Ysterofimia;
