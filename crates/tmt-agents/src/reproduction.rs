//! Reproduction and inheritance.
//!
//! The pool of agents removed in an iteration is shuffled and consumed in
//! adjacent pairs. Each pair draws a Poisson-distributed child count whose
//! mean, the expected-children parameter, drifts between a configured
//! minimum and maximum depending on how readily the population volunteered.
//!
//! Children inherit:
//! - an attachment style drawn from a categorical distribution that puts
//!   `(1 - mutation_rate) / 2` on each parent's style and spreads
//!   `mutation_rate` evenly over the remaining styles;
//! - a bitmask crossover of the parents' current worldview words.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Poisson};
use tmt_types::{AgentId, AttachmentStyle};

use crate::attachment::StyleDistribution;
use crate::error::AgentError;

/// Upper bound on children drawn for a single pair.
const MAX_CHILDREN_PER_PAIR: u32 = 64;

// ---------------------------------------------------------------------------
// Style inheritance
// ---------------------------------------------------------------------------

/// Categorical weights over [`AttachmentStyle::ALL`] for a child.
///
/// The mutation rate is clamped to `[0, 1]`. When both parents share a
/// style it receives the whole `1 - mutation_rate`.
pub fn child_style_weights(
    parent_a: AttachmentStyle,
    parent_b: AttachmentStyle,
    mutation_rate: f64,
) -> [f64; 4] {
    let mu = mutation_rate.clamp(0.0, 1.0);
    let inherited = (1.0 - mu) / 2.0;
    let others = AttachmentStyle::ALL
        .iter()
        .filter(|s| **s != parent_a && **s != parent_b)
        .count();
    let mutated = match u32::try_from(others) {
        Ok(n) if n > 0 => mu / f64::from(n),
        _ => 0.0,
    };

    AttachmentStyle::ALL.map(|style| {
        let mut w = 0.0;
        if style == parent_a {
            w += inherited;
        }
        if style == parent_b {
            w += inherited;
        }
        if style != parent_a && style != parent_b {
            w += mutated;
        }
        w
    })
}

/// Draw a child's attachment style.
pub fn sample_child_style(
    parent_a: AttachmentStyle,
    parent_b: AttachmentStyle,
    mutation_rate: f64,
    rng: &mut impl Rng,
) -> Result<AttachmentStyle, AgentError> {
    let dist = StyleDistribution::new(child_style_weights(parent_a, parent_b, mutation_rate))?;
    Ok(dist.sample(rng))
}

// ---------------------------------------------------------------------------
// Fertility
// ---------------------------------------------------------------------------

/// Draw the number of children for one pair.
///
/// A non-positive mean yields zero children.
pub fn sample_child_count(expected: f64, rng: &mut impl Rng) -> Result<u32, AgentError> {
    if expected <= 0.0 {
        return Ok(0);
    }
    let poisson = Poisson::new(expected).map_err(|e| AgentError::InvalidDistribution {
        reason: format!("poisson mean {expected}: {e}"),
    })?;
    let draw: f64 = poisson.sample(rng);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = draw.clamp(0.0, f64::from(MAX_CHILDREN_PER_PAIR)) as u32;
    Ok(count)
}

/// Bounds and rate for the expected-children drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FertilityBounds {
    /// Lowest allowed mean.
    pub min: f64,
    /// Highest allowed mean.
    pub max: f64,
    /// Multiplicative step applied per iteration (>= 1).
    pub drift: f64,
}

/// Move the expected-children mean one step.
///
/// Steps up (`* drift`) when `realized >= target`, down (`/ drift`)
/// otherwise, and clamps to `[min, max]`.
pub fn adjust_expected_children(
    current: f64,
    realized: f64,
    target: f64,
    bounds: FertilityBounds,
) -> f64 {
    let drift = if bounds.drift.is_finite() && bounds.drift > 0.0 {
        bounds.drift
    } else {
        1.0
    };
    let next = if realized >= target {
        current * drift
    } else {
        current / drift
    };
    next.clamp(bounds.min, bounds.max.max(bounds.min))
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// Shuffle a pool and pair adjacent members.
///
/// An odd pool yields `floor(n / 2)` pairs; with `clone_unpaired` the
/// leftover member is additionally paired with itself.
pub fn pair_parents(
    mut pool: Vec<AgentId>,
    clone_unpaired: bool,
    rng: &mut impl Rng,
) -> Vec<(AgentId, AgentId)> {
    pool.shuffle(rng);
    let chunks = pool.chunks_exact(2);
    let leftover = chunks.remainder().first().copied();
    let mut pairs: Vec<(AgentId, AgentId)> = chunks
        .filter_map(|pair| match pair {
            [a, b] => Some((*a, *b)),
            _ => None,
        })
        .collect();
    if clone_unpaired {
        if let Some(single) = leftover {
            pairs.push((single, single));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn sum(w: [f64; 4]) -> f64 {
        w.iter().sum()
    }

    #[test]
    fn weights_split_between_parents_and_mutation() {
        let w = child_style_weights(AttachmentStyle::Secure, AttachmentStyle::Fearful, 0.2);
        assert!((sum(w) - 1.0).abs() < 1e-12);
        assert!((w[0] - 0.4).abs() < 1e-12);
        assert!((w[3] - 0.4).abs() < 1e-12);
        assert!((w[1] - 0.1).abs() < 1e-12);
        assert!((w[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn identical_parents_concentrate_weight() {
        let w = child_style_weights(AttachmentStyle::Dismissive, AttachmentStyle::Dismissive, 0.3);
        assert!((sum(w) - 1.0).abs() < 1e-12);
        assert!((w[1] - 0.7).abs() < 1e-12);
        assert!((w[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_mutation_identical_parents_always_match() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..500 {
            let style = sample_child_style(
                AttachmentStyle::Preoccupied,
                AttachmentStyle::Preoccupied,
                0.0,
                &mut rng,
            )
            .unwrap();
            assert_eq!(style, AttachmentStyle::Preoccupied);
        }
    }

    #[test]
    fn full_mutation_never_inherits() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let style =
                sample_child_style(AttachmentStyle::Secure, AttachmentStyle::Fearful, 1.0, &mut rng)
                    .unwrap();
            assert!(style != AttachmentStyle::Secure && style != AttachmentStyle::Fearful);
        }
    }

    #[test]
    fn child_count_is_zero_for_zero_mean() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(sample_child_count(0.0, &mut rng).unwrap(), 0);
        assert_eq!(sample_child_count(-1.0, &mut rng).unwrap(), 0);
    }

    #[test]
    fn child_count_mean_is_close_to_expected() {
        let mut rng = SmallRng::seed_from_u64(42);
        let draws = 4000_u32;
        let total: u32 = (0..draws)
            .map(|_| sample_child_count(2.0, &mut rng).unwrap())
            .sum();
        let mean = f64::from(total) / f64::from(draws);
        assert!((mean - 2.0).abs() < 0.15, "mean {mean}");
    }

    #[test]
    fn expected_children_drifts_within_bounds() {
        let bounds = FertilityBounds {
            min: 1.9,
            max: 2.1,
            drift: 1.05,
        };
        let up = adjust_expected_children(2.0, 0.3, 0.2, bounds);
        assert!((up - 2.1).abs() < 1e-12);
        let down = adjust_expected_children(2.0, 0.1, 0.2, bounds);
        assert!((down - 1.9).abs() < 1e-12);
        let small = FertilityBounds {
            min: 1.0,
            max: 3.0,
            drift: 1.1,
        };
        let met = adjust_expected_children(2.0, 0.2, 0.2, small);
        assert!((met - 2.2).abs() < 1e-12);
    }

    #[test]
    fn odd_pool_yields_floor_half_pairs() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pool: Vec<AgentId> = (0..7).map(|_| AgentId::new()).collect();
        let pairs = pair_parents(pool.clone(), false, &mut rng);
        assert_eq!(pairs.len(), 3);
        for (a, b) in &pairs {
            assert_ne!(a, b);
            assert!(pool.contains(a) && pool.contains(b));
        }
        let cloned = pair_parents(pool, true, &mut rng);
        assert_eq!(cloned.len(), 4);
        let (a, b) = cloned[3];
        assert_eq!(a, b);
    }

    #[test]
    fn empty_pool_has_no_pairs() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(pair_parents(Vec::new(), true, &mut rng).is_empty());
    }
}
