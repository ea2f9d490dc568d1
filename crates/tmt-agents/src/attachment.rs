//! Attachment styles: birth-time parameter ranges and movement policies.
//!
//! The four styles differ only in the ranges their scalars are drawn from
//! and in the target their movement policy picks. Every agent is the same
//! record carrying a [`AttachmentStyle`] discriminant; nothing here is
//! polymorphic.
//!
//! | Style       | anxiety  | avoidance | check    | reply    | alpha    | beta     |
//! |-------------|----------|-----------|----------|----------|----------|----------|
//! | Secure      | low      | low       | low      | high     | high     | low      |
//! | Dismissive  | low      | high      | low      | low      | low      | low      |
//! | Preoccupied | high     | low       | high     | high     | high     | high     |
//! | Fearful     | high     | high      | high     | low      | low      | high     |
//!
//! "low" is `[0, 0.5)` and "high" is `[0.5, 1)`.

use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use tmt_types::AttachmentStyle;

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Half-open sampling interval for one scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    low: f64,
    high: f64,
}

const LOW: Band = Band {
    low: 0.0,
    high: 0.5,
};

const HIGH: Band = Band {
    low: 0.5,
    high: 1.0,
};

impl Band {
    fn sample(self, rng: &mut impl Rng) -> f64 {
        rng.random_range(self.low..self.high)
    }
}

/// Sampling bands for every scalar of one style.
#[derive(Debug, Clone, Copy)]
struct StyleBands {
    anxiety: Band,
    avoidance: Band,
    check: Band,
    reply: Band,
    alpha: Band,
    beta: Band,
}

const fn bands(style: AttachmentStyle) -> StyleBands {
    match style {
        AttachmentStyle::Secure => StyleBands {
            anxiety: LOW,
            avoidance: LOW,
            check: LOW,
            reply: HIGH,
            alpha: HIGH,
            beta: LOW,
        },
        AttachmentStyle::Dismissive => StyleBands {
            anxiety: LOW,
            avoidance: HIGH,
            check: LOW,
            reply: LOW,
            alpha: LOW,
            beta: LOW,
        },
        AttachmentStyle::Preoccupied => StyleBands {
            anxiety: HIGH,
            avoidance: LOW,
            check: HIGH,
            reply: HIGH,
            alpha: HIGH,
            beta: HIGH,
        },
        AttachmentStyle::Fearful => StyleBands {
            anxiety: HIGH,
            avoidance: HIGH,
            check: HIGH,
            reply: LOW,
            alpha: LOW,
            beta: HIGH,
        },
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Attachment style with its anxiety and avoidance scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    /// The categorical style.
    pub style: AttachmentStyle,
    /// Probability of creating a tie to an unconnected cluster-mate.
    pub anxiety: f64,
    /// Probability of severing a tie to a connected cluster-mate.
    pub avoidance: f64,
}

/// Wellbeing-check protocol parameters, fixed at birth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellbeingParams {
    /// Probability of sending checks to the cluster this iteration.
    pub check_probability: f64,
    /// Probability of replying to a received check.
    pub reply_probability: f64,
    /// Reinforcement rate applied on a received check or reply.
    pub alpha: f64,
    /// Decay rate applied when no check was received.
    pub beta: f64,
}

/// Everything an agent's style fixes at birth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleProfile {
    /// Style and tie-dynamics scalars.
    pub attachment: Attachment,
    /// Messaging parameters.
    pub wellbeing: WellbeingParams,
}

impl StyleProfile {
    /// Draw a profile from the style's bands.
    pub fn sample(style: AttachmentStyle, rng: &mut impl Rng) -> Self {
        let b = bands(style);
        Self {
            attachment: Attachment {
                style,
                anxiety: b.anxiety.sample(rng),
                avoidance: b.avoidance.sample(rng),
            },
            wellbeing: WellbeingParams {
                check_probability: b.check.sample(rng),
                reply_probability: b.reply.sample(rng),
                alpha: b.alpha.sample(rng),
                beta: b.beta.sample(rng),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Style draws
// ---------------------------------------------------------------------------

/// Categorical distribution over the four styles.
#[derive(Debug, Clone)]
pub struct StyleDistribution {
    index: WeightedIndex<f64>,
}

impl StyleDistribution {
    /// Build a distribution from weights ordered as [`AttachmentStyle::ALL`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidDistribution`] if any weight is negative
    /// or non-finite, or all weights are zero.
    pub fn new(weights: [f64; 4]) -> Result<Self, AgentError> {
        let index = WeightedIndex::new(weights).map_err(|e| AgentError::InvalidDistribution {
            reason: format!("style weights {weights:?}: {e}"),
        })?;
        Ok(Self { index })
    }

    /// Draw a style.
    pub fn sample(&self, rng: &mut impl Rng) -> AttachmentStyle {
        AttachmentStyle::ALL
            .get(self.index.sample(rng))
            .copied()
            .unwrap_or(AttachmentStyle::Secure)
    }
}

// ---------------------------------------------------------------------------
// Movement policy
// ---------------------------------------------------------------------------

/// Per-style choice of movement target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPolicy {
    /// Move toward the closest living network peer.
    TowardClosestPeer,
    /// Move toward the peer held in highest esteem.
    TowardStrongestTie,
    /// Move away from the closest living network peer.
    AwayFromClosestPeer,
    /// Move away from the closest cluster-mate.
    AwayFromClosestClusterMate,
}

impl MovementPolicy {
    /// The policy an attachment style follows.
    pub const fn for_style(style: AttachmentStyle) -> Self {
        match style {
            AttachmentStyle::Secure => Self::TowardClosestPeer,
            AttachmentStyle::Preoccupied => Self::TowardStrongestTie,
            AttachmentStyle::Dismissive => Self::AwayFromClosestPeer,
            AttachmentStyle::Fearful => Self::AwayFromClosestClusterMate,
        }
    }
}
