//! Three-factor self-sacrifice adjudication (ASP).
//!
//! Each living agent computes three scores, each a weighted sum of
//! sub-factors in `[0, 1]`:
//!
//! - **Mortality Salience**: cluster and network elimination exposure,
//!   relative age within the network, and memorial proximity.
//! - **Worldview Validation**: worldview alignment with cluster-mates and
//!   with network peers, and the ysterofimia ratio.
//! - **Relationship Validation**: estrangement, mean esteem across ties,
//!   and heroism rank among network peers.
//!
//! Every score votes against the threshold τ: above is `+1`, below is
//! `-1`, equal is `0`. The sign of the vote sum picks the decision.
//!
//! Any factor without a valid denominator (no peers, no cluster-mates, no
//! observed deaths, zero tolerance) contributes `0.0`.

use std::cmp::Ordering;

use tmt_types::{AspDecision, DecisionDiagnostic, Position};

use crate::agent::{Agent, AgentRegistry};
use crate::config::DecisionConfig;
use crate::movement::cluster_mates;

/// Floor applied to distances in proximity sums so a marker under the
/// agent does not divide by zero.
const MIN_PROXIMITY_DISTANCE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Context and scores
// ---------------------------------------------------------------------------

/// World state an adjudication reads.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Every living agent.
    pub registry: &'a AgentRegistry,
    /// Every tombstone and temple on the grid.
    pub memorials: &'a [Position],
}

/// The three ASP scores of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspScores {
    /// Mortality Salience.
    pub mortality_salience: f64,
    /// Worldview Validation.
    pub worldview_validation: f64,
    /// Relationship Validation.
    pub relationship_validation: f64,
}

impl AspScores {
    const fn as_array(&self) -> [f64; 3] {
        [
            self.mortality_salience,
            self.worldview_validation,
            self.relationship_validation,
        ]
    }

    /// Sum of the three threshold votes.
    pub fn vote_sum(&self, threshold: f64) -> i32 {
        self.as_array()
            .iter()
            .map(|s| vote(*s, threshold))
            .fold(0_i32, i32::saturating_add)
    }

    /// Mean of `min(score / threshold, 1)`; each term is `1` when the
    /// threshold is zero.
    pub fn confidence(&self, threshold: f64) -> f64 {
        let sum: f64 = self
            .as_array()
            .iter()
            .map(|s| {
                if threshold > 0.0 {
                    (s / threshold).min(1.0)
                } else {
                    1.0
                }
            })
            .sum();
        sum / 3.0
    }
}

/// One score's vote against the threshold.
pub fn vote(score: f64, threshold: f64) -> i32 {
    match score.partial_cmp(&threshold) {
        Some(Ordering::Greater) => 1,
        Some(Ordering::Less) => -1,
        Some(Ordering::Equal) | None => 0,
    }
}

// ---------------------------------------------------------------------------
// Sub-factors
// ---------------------------------------------------------------------------

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let p = u32::try_from(part).unwrap_or(u32::MAX);
    let w = u32::try_from(whole).unwrap_or(u32::MAX);
    (f64::from(p) / f64::from(w)).clamp(0.0, 1.0)
}

/// `min(observed / tolerance, 1)`, or `0.0` with a zero tolerance.
pub fn clipped_exposure(observed: u32, tolerance: u32) -> f64 {
    if tolerance == 0 {
        return 0.0;
    }
    (f64::from(observed) / f64::from(tolerance)).min(1.0)
}

/// Fraction of living network peers strictly younger than the agent.
pub fn relative_age(agent: &Agent, registry: &AgentRegistry) -> f64 {
    let ages: Vec<u32> = agent
        .social
        .peers()
        .filter_map(|id| registry.get(id).map(Agent::age))
        .collect();
    let younger = ages.iter().filter(|a| **a < agent.age()).count();
    share(younger, ages.len())
}

/// Inverse-distance weight of a set of positions as seen from `from`.
fn influence(from: Position, positions: impl IntoIterator<Item = Position>) -> f64 {
    positions
        .into_iter()
        .map(|p| 1.0 / from.distance(p).max(MIN_PROXIMITY_DISTANCE))
        .sum()
}

/// Influence of living cluster-mates relative to that of all memorials.
///
/// `C / (C + M)` with inverse-distance sums `C` over cluster-mates and `M`
/// over tombstones and temples; `0.0` when both are zero.
pub fn memorial_proximity(from: Position, mates: &[Position], memorials: &[Position]) -> f64 {
    let living = influence(from, mates.iter().copied());
    let dead = influence(from, memorials.iter().copied());
    let total = living + dead;
    if total <= 0.0 {
        return 0.0;
    }
    (living / total).clamp(0.0, 1.0)
}

/// Mean worldview alignment with a set of living agents.
pub fn mean_alignment<'a>(
    agent: &Agent,
    others: impl IntoIterator<Item = &'a Agent>,
    window: usize,
) -> f64 {
    let (sum, n) = others
        .into_iter()
        .filter(|o| o.id != agent.id)
        .fold((0.0_f64, 0_usize), |(sum, n), o| {
            (
                sum + agent.worldview.alignment(&o.worldview, window),
                n.saturating_add(1),
            )
        });
    if n == 0 {
        return 0.0;
    }
    let n = u32::try_from(n).unwrap_or(u32::MAX);
    sum / f64::from(n)
}

/// Fraction of living network peers with strictly lower heroism.
pub fn heroism_rank(agent: &Agent, registry: &AgentRegistry) -> f64 {
    let peers: Vec<u32> = agent
        .social
        .peers()
        .filter_map(|id| registry.get(id).map(Agent::heroism))
        .collect();
    let below = peers.iter().filter(|h| **h < agent.heroism()).count();
    share(below, peers.len())
}

// ---------------------------------------------------------------------------
// Adjudication
// ---------------------------------------------------------------------------

/// Compute the three ASP scores of an agent.
pub fn scores(agent: &Agent, ctx: &DecisionContext<'_>, config: &DecisionConfig) -> AspScores {
    let w = &config.weights;
    let registry = ctx.registry;

    let mates: Vec<&Agent> = cluster_mates(agent, registry)
        .into_iter()
        .filter_map(|id| registry.get(id))
        .collect();
    let mate_positions: Vec<Position> = mates.iter().map(|a| a.position).collect();
    let peers: Vec<&Agent> = agent
        .social
        .peers()
        .filter_map(|id| registry.get(id))
        .collect();

    let mortality_salience = w.cluster_exposure.mul_add(
        clipped_exposure(agent.exposure.cluster, config.cluster_elimination_tolerance),
        w.network_exposure.mul_add(
            clipped_exposure(agent.exposure.network, config.network_elimination_tolerance),
            w.relative_age.mul_add(
                relative_age(agent, registry),
                w.memorial_proximity
                    * memorial_proximity(agent.position, &mate_positions, ctx.memorials),
            ),
        ),
    );

    let worldview_validation = w.cluster_alignment.mul_add(
        mean_alignment(agent, mates.iter().copied(), config.alignment_window),
        w.network_alignment.mul_add(
            mean_alignment(agent, peers.iter().copied(), config.alignment_window),
            w.ysterofimia * agent.ysterofimia.ratio(),
        ),
    );

    let relationship_validation = w.estrangement.mul_add(
        agent.social.estrangement(),
        w.mean_esteem.mul_add(
            agent.social.mean_esteem(),
            w.heroism_rank * heroism_rank(agent, registry),
        ),
    );

    AspScores {
        mortality_salience: mortality_salience.clamp(0.0, 1.0),
        worldview_validation: worldview_validation.clamp(0.0, 1.0),
        relationship_validation: relationship_validation.clamp(0.0, 1.0),
    }
}

/// Adjudicate one agent, returning the decision and its diagnostics.
///
/// This does not mutate the agent. The caller records heroism once a
/// [`AspDecision::SelfSacrifice`] volunteer is actually taken.
pub fn adjudicate(
    agent: &Agent,
    ctx: &DecisionContext<'_>,
    config: &DecisionConfig,
) -> DecisionDiagnostic {
    let s = scores(agent, ctx, config);
    let decision = AspDecision::from_vote_sum(s.vote_sum(config.threshold));
    DecisionDiagnostic {
        agent_id: agent.id,
        mortality_salience: s.mortality_salience,
        worldview_validation: s.worldview_validation,
        relationship_validation: s.relationship_validation,
        confidence: s.confidence(config.threshold),
        decision,
    }
}

#[cfg(test)]
mod tests {
    use tmt_types::AttachmentStyle;

    use super::*;
    use crate::agent::tests::test_agent;

    fn in_unit(v: f64) -> bool {
        (0.0..=1.0).contains(&v)
    }

    #[test]
    fn votes_respect_threshold() {
        assert_eq!(vote(0.6, 0.5), 1);
        assert_eq!(vote(0.4, 0.5), -1);
        assert_eq!(vote(0.5, 0.5), 0);
        assert_eq!(vote(f64::NAN, 0.5), 0);
    }

    #[test]
    fn exposure_clips_and_handles_zero_tolerance() {
        assert!(clipped_exposure(3, 0).abs() < f64::EPSILON);
        assert!((clipped_exposure(3, 6) - 0.5).abs() < 1e-12);
        assert!((clipped_exposure(30, 6) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn memorial_proximity_is_a_ratio() {
        let me = Position::new(0, 0);
        assert!(memorial_proximity(me, &[], &[]).abs() < f64::EPSILON);
        assert!((memorial_proximity(me, &[Position::new(1, 0)], &[]) - 1.0).abs() < 1e-12);
        assert!(memorial_proximity(me, &[], &[Position::new(0, 0)]).abs() < 1e-12);
        let mixed = memorial_proximity(me, &[Position::new(2, 0)], &[Position::new(1, 0)]);
        // C = 0.5, M = 1.0
        assert!((mixed - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn lone_agent_has_neutral_factors() {
        let reg = AgentRegistry::new();
        let me = test_agent(AttachmentStyle::Secure, Position::new(2, 2), 10);
        assert!(relative_age(&me, &reg).abs() < f64::EPSILON);
        assert!(heroism_rank(&me, &reg).abs() < f64::EPSILON);
        assert!(mean_alignment(&me, reg.all(), 5).abs() < f64::EPSILON);
    }

    #[test]
    fn relative_age_is_percentile_rank() {
        let mut reg = AgentRegistry::new();
        let mut me = test_agent(AttachmentStyle::Secure, Position::new(0, 0), 10);
        for age in [2, 5, 10, 20] {
            let peer = test_agent(AttachmentStyle::Secure, Position::new(1, 1), age);
            me.social.insert_tie(peer.id, 0.5);
            reg.insert(peer).unwrap();
        }
        // Peers aged 2 and 5 are younger; 10 is not strictly younger.
        assert!((relative_age(&me, &reg) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn heroism_rank_counts_less_heroic_peers() {
        let mut reg = AgentRegistry::new();
        let mut me = test_agent(AttachmentStyle::Secure, Position::new(0, 0), 10);
        me.record_heroism();
        let a = test_agent(AttachmentStyle::Secure, Position::new(1, 1), 3);
        let mut b = test_agent(AttachmentStyle::Secure, Position::new(1, 2), 3);
        b.record_heroism();
        b.record_heroism();
        me.social.insert_tie(a.id, 0.5);
        me.social.insert_tie(b.id, 0.5);
        reg.insert(a).unwrap();
        reg.insert(b).unwrap();
        assert!((heroism_rank(&me, &reg) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let mut reg = AgentRegistry::new();
        let mut me = test_agent(AttachmentStyle::Fearful, Position::new(4, 4), 30);
        me.cluster_id = Some(0);
        me.exposure.cluster = 50;
        me.exposure.network = 50;
        me.ysterofimia.record_death(true, 0.9);
        for i in 0..5 {
            let mut peer = test_agent(AttachmentStyle::Secure, Position::new(i, 0), 5);
            peer.cluster_id = Some(0);
            me.social.insert_tie(peer.id, 1.0);
            reg.insert(peer).unwrap();
        }
        let memorials = [Position::new(4, 5), Position::new(9, 9)];
        let ctx = DecisionContext {
            registry: &reg,
            memorials: &memorials,
        };
        let config = DecisionConfig::default();
        let s = scores(&me, &ctx, &config);
        assert!(in_unit(s.mortality_salience));
        assert!(in_unit(s.worldview_validation));
        assert!(in_unit(s.relationship_validation));
        let diag = adjudicate(&me, &ctx, &config);
        assert!(in_unit(diag.confidence));
        assert_eq!(diag.agent_id, me.id);
    }

    #[test]
    fn saturated_agent_volunteers() {
        let mut reg = AgentRegistry::new();
        let mut me = test_agent(AttachmentStyle::Preoccupied, Position::new(0, 0), 40);
        me.cluster_id = Some(0);
        me.exposure.cluster = 100;
        me.exposure.network = 100;
        me.ysterofimia.record_death(true, 1.0);
        let mut peer = test_agent(AttachmentStyle::Secure, Position::new(1, 0), 1);
        peer.cluster_id = Some(0);
        me.social.insert_tie(peer.id, 1.0);
        reg.insert(peer).unwrap();
        let ctx = DecisionContext {
            registry: &reg,
            memorials: &[],
        };
        // Identical worldviews, full esteem, older than every peer.
        let diag = adjudicate(&me, &ctx, &DecisionConfig::default());
        assert!(diag.mortality_salience > 0.5);
        assert!(diag.worldview_validation > 0.5);
        assert_eq!(diag.decision, AspDecision::SelfSacrifice);
        // Relationship Validation is 0.25: only mean esteem contributes.
        assert!((diag.relationship_validation - 0.25).abs() < 1e-12);
        assert!((diag.confidence - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn isolated_agent_refuses() {
        let reg = AgentRegistry::new();
        let me = test_agent(AttachmentStyle::Dismissive, Position::new(0, 0), 1);
        let ctx = DecisionContext {
            registry: &reg,
            memorials: &[],
        };
        let diag = adjudicate(&me, &ctx, &DecisionConfig::default());
        assert_eq!(diag.decision, AspDecision::NotSelfSacrifice);
        assert!(diag.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_threshold_gives_full_confidence() {
        let s = AspScores {
            mortality_salience: 0.1,
            worldview_validation: 0.0,
            relationship_validation: 0.9,
        };
        assert!((s.confidence(0.0) - 1.0).abs() < 1e-12);
        assert_eq!(s.vote_sum(0.0), 2);
    }
}
