//! Movement targets for each attachment style.
//!
//! Every turn the host asks each agent where it wants to go. The answer is
//! a target cell (possibly outside the grid for "away" policies); the grid
//! turns it into at most one legal step. An agent with no target takes a
//! random legal step.

use rand::Rng;
use rand::seq::IndexedRandom;
use tmt_types::{AgentId, Position};

use crate::agent::{Agent, AgentRegistry};
use crate::attachment::MovementPolicy;

/// The nearest of a set of candidates, ties broken uniformly at random.
pub fn nearest(
    from: Position,
    candidates: impl IntoIterator<Item = (AgentId, Position)>,
    rng: &mut impl Rng,
) -> Option<(AgentId, Position)> {
    let mut best: Vec<(AgentId, Position)> = Vec::new();
    let mut best_distance = f64::INFINITY;
    for (id, pos) in candidates {
        let d = from.distance(pos);
        if (d - best_distance).abs() < f64::EPSILON {
            best.push((id, pos));
        } else if d < best_distance {
            best_distance = d;
            best.clear();
            best.push((id, pos));
        }
    }
    best.choose(rng).copied()
}

/// The closest living network peer of an agent.
pub fn closest_friend(
    agent: &Agent,
    registry: &AgentRegistry,
    rng: &mut impl Rng,
) -> Option<(AgentId, Position)> {
    let peers = agent
        .social
        .peers()
        .filter_map(|id| registry.position_of(id).map(|p| (id, p)));
    nearest(agent.position, peers, rng)
}

/// Living agents sharing the agent's current cluster, excluding itself.
pub fn cluster_mates(agent: &Agent, registry: &AgentRegistry) -> Vec<AgentId> {
    let Some(cluster) = agent.cluster_id else {
        return Vec::new();
    };
    registry
        .all()
        .filter(|other| other.id != agent.id && other.cluster_id == Some(cluster))
        .map(|other| other.id)
        .collect()
}

/// Where the agent wants to move this turn, if anywhere.
pub fn movement_target(
    agent: &Agent,
    registry: &AgentRegistry,
    rng: &mut impl Rng,
) -> Option<Position> {
    match MovementPolicy::for_style(agent.style()) {
        MovementPolicy::TowardClosestPeer => closest_friend(agent, registry, rng).map(|(_, p)| p),
        MovementPolicy::TowardStrongestTie => {
            // Dead peers are forgotten at the iteration boundary, but fall
            // back to the closest friend if the strongest tie is gone.
            let strongest = agent
                .social
                .strongest_tie()
                .and_then(|(id, _)| registry.position_of(id));
            strongest.or_else(|| closest_friend(agent, registry, rng).map(|(_, p)| p))
        }
        MovementPolicy::AwayFromClosestPeer => closest_friend(agent, registry, rng)
            .map(|(_, p)| agent.position.reflect_away_from(p)),
        MovementPolicy::AwayFromClosestClusterMate => {
            let mates = cluster_mates(agent, registry)
                .into_iter()
                .filter_map(|id| registry.position_of(id).map(|p| (id, p)));
            nearest(agent.position, mates, rng).map(|(_, p)| agent.position.reflect_away_from(p))
        }
    }
}
