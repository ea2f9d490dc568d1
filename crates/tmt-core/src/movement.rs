//! The movement phase.
//!
//! Agents are visited in a freshly shuffled order each turn. Each asks its
//! style's policy for a target and takes at most one step toward it over
//! free in-bounds cells; an agent with no target takes a random legal step.
//! Occupancy is updated immediately, so later movers see earlier moves.

use rand::Rng;
use rand::seq::SliceRandom;
use tmt_agents::{AgentRegistry, movement_target};
use tmt_world::{Grid, WorldError};
use tracing::trace;

/// Move every living agent one step.
///
/// Returns the number of agents that changed cell.
///
/// # Errors
///
/// Returns [`WorldError::AgentNotAt`] if an agent's recorded position does
/// not match the grid.
pub fn move_agents(
    grid: &mut Grid,
    registry: &mut AgentRegistry,
    rng: &mut impl Rng,
) -> Result<u32, WorldError> {
    let mut order = registry.ids();
    order.shuffle(rng);

    let mut moved = 0_u32;
    for id in order {
        let Some(agent) = registry.get(id) else {
            continue;
        };
        let from = agent.position;
        let to = match movement_target(agent, registry, rng) {
            Some(target) => grid.step_toward(from, target),
            None => grid.step_random(from, rng),
        };
        if to == from {
            continue;
        }
        grid.move_agent(id, from, to)?;
        if let Some(agent) = registry.get_mut(id) {
            agent.position = to;
        }
        moved = moved.saturating_add(1);
        trace!(agent_id = %id, %from, %to, "Agent moved");
    }
    Ok(moved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tmt_agents::{Agent, AgentSeed, StyleProfile, Telomere, Worldview};
    use tmt_types::{AgentId, AttachmentStyle, Position};

    use super::*;

    fn test_agent(style: AttachmentStyle, position: Position, age: u32) -> Agent {
        let mut rng = SmallRng::seed_from_u64(u64::from(age));
        Agent::new(AgentSeed {
            id: AgentId::new(),
            position,
            age,
            profile: StyleProfile::sample(style, &mut rng),
            telomere: Telomere::new(0.0, 0.0, 100),
            worldview: Worldview::from_opinion(0),
            parents: None,
        })
    }

    fn setup(agents: &[(AttachmentStyle, Position)]) -> (Grid, AgentRegistry, Vec<AgentId>) {
        let mut grid = Grid::new(10, 10).unwrap();
        let mut registry = AgentRegistry::new();
        let mut ids = Vec::new();
        for (style, pos) in agents {
            let agent = test_agent(*style, *pos, 10);
            grid.place(agent.id, agent.position).unwrap();
            ids.push(agent.id);
            registry.insert(agent).unwrap();
        }
        (grid, registry, ids)
    }

    #[test]
    fn secure_agent_steps_toward_friend() {
        let mut rng = SmallRng::seed_from_u64(42);
        let (mut grid, mut registry, ids) = setup(&[
            (AttachmentStyle::Secure, Position::new(0, 0)),
            (AttachmentStyle::Secure, Position::new(5, 5)),
        ]);
        registry.get_mut(ids[0]).unwrap().social.insert_tie(ids[1], 0.8);
        let before = registry.get(ids[0]).unwrap().position;
        move_agents(&mut grid, &mut registry, &mut rng).unwrap();
        let after = registry.get(ids[0]).unwrap().position;
        assert!(after.distance(Position::new(5, 5)) < before.distance(Position::new(5, 5)));
    }

    #[test]
    fn grid_tracks_every_move() {
        let mut rng = SmallRng::seed_from_u64(7);
        let (mut grid, mut registry, _) = setup(&[
            (AttachmentStyle::Secure, Position::new(1, 1)),
            (AttachmentStyle::Dismissive, Position::new(2, 2)),
            (AttachmentStyle::Preoccupied, Position::new(3, 3)),
            (AttachmentStyle::Fearful, Position::new(4, 4)),
        ]);
        for _ in 0..10 {
            move_agents(&mut grid, &mut registry, &mut rng).unwrap();
            assert_eq!(grid.agent_count(), 4);
            for agent in registry.all() {
                assert!(grid.in_bounds(agent.position));
                assert_eq!(grid.occupant(agent.position), Some(agent.id));
            }
        }
    }

    #[test]
    fn boxed_in_agent_stays_put() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut grid = Grid::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let agent = test_agent(AttachmentStyle::Fearful, Position::new(0, 0), 1);
        grid.place(agent.id, agent.position).unwrap();
        registry.insert(agent).unwrap();
        assert_eq!(move_agents(&mut grid, &mut registry, &mut rng).unwrap(), 0);
    }
}
