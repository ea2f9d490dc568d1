//! Enumeration types for the TMT attachment simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Attachment style
// ---------------------------------------------------------------------------

/// One of the four attachment profiles an agent is born with.
///
/// The style fixes the ranges from which the agent's anxiety, avoidance,
/// and wellbeing-protocol parameters are drawn, and selects its movement
/// policy. It never changes after birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AttachmentStyle {
    /// Low anxiety, low avoidance.
    Secure,
    /// Low anxiety, high avoidance.
    Dismissive,
    /// High anxiety, low avoidance.
    Preoccupied,
    /// High anxiety, high avoidance.
    Fearful,
}

impl AttachmentStyle {
    /// Every style, in a fixed order used for categorical draws.
    pub const ALL: [Self; 4] = [
        Self::Secure,
        Self::Dismissive,
        Self::Preoccupied,
        Self::Fearful,
    ];

    /// Lower-case label used in snapshots and log fields.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Dismissive => "dismissive",
            Self::Preoccupied => "preoccupied",
            Self::Fearful => "fearful",
        }
    }
}

impl core::fmt::Display for AttachmentStyle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ASP decision
// ---------------------------------------------------------------------------

/// Outcome of the three-factor self-sacrifice adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AspDecision {
    /// The agent volunteers for elimination this iteration.
    SelfSacrifice,
    /// The agent refuses to volunteer.
    NotSelfSacrifice,
    /// The votes cancelled out.
    Inaction,
}

impl AspDecision {
    /// Map a summed vote to a decision.
    pub const fn from_vote_sum(sum: i32) -> Self {
        if sum > 0 {
            Self::SelfSacrifice
        } else if sum < 0 {
            Self::NotSelfSacrifice
        } else {
            Self::Inaction
        }
    }

    /// Whether this decision makes the agent a volunteer.
    pub const fn is_volunteer(self) -> bool {
        matches!(self, Self::SelfSacrifice)
    }
}

// ---------------------------------------------------------------------------
// Elimination
// ---------------------------------------------------------------------------

/// How an agent left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EliminationKind {
    /// Died from the telomere mortality draw.
    Natural,
    /// Selected as a non-volunteer to cover a quota shortfall.
    Forced,
    /// Selected from the volunteers to fill the quota.
    Voluntary,
}

impl EliminationKind {
    /// The permanent grid marker left at the agent's last position.
    pub const fn marker(self) -> MarkerKind {
        match self {
            Self::Natural | Self::Forced => MarkerKind::Tombstone,
            Self::Voluntary => MarkerKind::Temple,
        }
    }

    /// Whether this elimination counts toward the self-sacrifice bucket
    /// of a peer's ysterofimia ledger.
    pub const fn is_voluntary(self) -> bool {
        matches!(self, Self::Voluntary)
    }
}

impl core::fmt::Display for EliminationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Natural => f.write_str("natural"),
            Self::Forced => f.write_str("forced"),
            Self::Voluntary => f.write_str("voluntary"),
        }
    }
}

/// Permanent grid marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MarkerKind {
    /// Left by a natural or forced death.
    Tombstone,
    /// Left by a voluntary self-sacrifice.
    Temple,
}
