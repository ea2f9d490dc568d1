//! Core value structs shared between the engine and its export collaborators.
//!
//! Covers grid positions, the per-agent snapshot handed to the recorder on
//! every recorded turn, and the end-of-iteration summary.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AspDecision, AttachmentStyle};
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer lattice position.
///
/// Coordinates are signed so that movement targets computed by "move away"
/// policies may temporarily fall outside the grid before being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// The point reflected through `self` away from `other`.
    ///
    /// Used by avoidant movement policies: `self + (self - other)`.
    pub const fn reflect_away_from(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_mul(2).saturating_sub(other.x),
            y: self.y.saturating_mul(2).saturating_sub(other.y),
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Compact view of an agent's worldview ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldviewSummary {
    /// The most recent opinion word (0 for an empty ledger).
    pub current: u32,
    /// Number of entries in the ledger.
    pub entries: u32,
}

/// Per-agent snapshot exposed to the export/log collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// The agent's identifier.
    pub id: AgentId,
    /// Whether the agent is alive.
    pub alive: bool,
    /// Age in iterations.
    pub age: u32,
    /// Attachment style.
    pub style: AttachmentStyle,
    /// Anxiety scalar in `[0, 1]`.
    pub anxiety: f64,
    /// Avoidance scalar in `[0, 1]`.
    pub avoidance: f64,
    /// Cluster assigned this iteration, if clustering has run.
    pub cluster_id: Option<u32>,
    /// Grid position.
    pub position: Position,
    /// Worldview ledger summary.
    pub worldview: WorldviewSummary,
    /// Number of times the agent volunteered.
    pub heroism: u32,
}

/// Diagnostic record of one agent's self-sacrifice adjudication.
///
/// Written for external logging only; nothing in the engine reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionDiagnostic {
    /// The adjudicated agent.
    pub agent_id: AgentId,
    /// Mortality Salience score.
    pub mortality_salience: f64,
    /// Worldview Validation score.
    pub worldview_validation: f64,
    /// Relationship Validation score.
    pub relationship_validation: f64,
    /// Mean of `min(score / threshold, 1)` over the three scores.
    pub confidence: f64,
    /// The resulting decision.
    pub decision: AspDecision,
}

/// End-of-iteration summary exposed to the export/log collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IterationSummary {
    /// Iteration index (0-based).
    pub iteration: u32,
    /// Living agents when the pass began.
    pub population_before: u32,
    /// Living agents when the pass finished (survivors plus newborns).
    pub population_after: u32,
    /// Agents removed by the telomere draw.
    pub natural_deaths: Vec<AgentId>,
    /// Agents removed by the quota, voluntary and forced.
    pub eliminated: Vec<AgentId>,
    /// The voluntary subset of `eliminated`.
    pub self_sacrificed: Vec<AgentId>,
    /// Number of agents whose decision was to volunteer.
    pub volunteers: u32,
    /// The elimination quota for this iteration.
    pub required_eliminations: u32,
    /// Agents born this iteration.
    pub spawned: Vec<AgentId>,
    /// Expected-children parameter after this iteration's adjustment.
    pub expected_children: f64,
    /// Every tombstone on the grid.
    pub tombstones: Vec<Position>,
    /// Every temple on the grid.
    pub temples: Vec<Position>,
    /// Decision diagnostics for every adjudicated agent.
    pub diagnostics: Vec<DecisionDiagnostic>,
}
