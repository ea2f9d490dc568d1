//! The agent record and the registry that owns every living agent.
//!
//! An [`Agent`] is a single record for all four attachment styles: the
//! style is a discriminant inside [`Attachment`], not a type. The
//! [`AgentRegistry`] is owned by one engine instance and replaces any
//! process-wide lookup table; lookups of identifiers that have already
//! been removed simply return `None`.

use std::collections::{BTreeMap, BTreeSet};

use tmt_types::{AgentId, AgentSnapshot, AttachmentStyle, Position, WorldviewSummary};

use crate::attachment::{Attachment, StyleProfile, WellbeingParams};
use crate::error::AgentError;
use crate::social::SocialGraph;
use crate::telomere::Telomere;
use crate::worldview::Worldview;
use crate::ysterofimia::Ysterofimia;

/// Parameters for creating an agent.
///
/// Bundles the birth-time data so seeding and reproduction share one
/// constructor.
#[derive(Debug, Clone)]
pub struct AgentSeed {
    /// Identifier of the new agent.
    pub id: AgentId,
    /// Cell the agent is placed on.
    pub position: Position,
    /// Starting age (0 for newborns, random at seeding).
    pub age: u32,
    /// Style-derived scalars.
    pub profile: StyleProfile,
    /// Mortality function.
    pub telomere: Telomere,
    /// Initial worldview ledger.
    pub worldview: Worldview,
    /// Both parents, for agents born by reproduction.
    pub parents: Option<(AgentId, AgentId)>,
}

/// Elimination counts an agent has witnessed over its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EliminationExposure {
    /// Deaths of cluster-mates.
    pub cluster: u32,
    /// Deaths of network peers.
    pub network: u32,
}

/// One simulated entity.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Current grid cell.
    pub position: Position,
    /// Age in iterations; only grows.
    age: u32,
    /// Style, anxiety, avoidance.
    pub attachment: Attachment,
    /// Wellbeing-check protocol parameters.
    pub wellbeing: WellbeingParams,
    /// Opinion history.
    pub worldview: Worldview,
    /// Weighted ties to peers.
    pub social: SocialGraph,
    /// Cluster assigned by the latest clustering pass.
    pub cluster_id: Option<u32>,
    /// Times this agent volunteered; only grows.
    heroism: u32,
    /// Witnessed eliminations.
    pub exposure: EliminationExposure,
    /// Posthumous-esteem ledger for dead peers.
    pub ysterofimia: Ysterofimia,
    /// Mortality function.
    pub telomere: Telomere,
    /// Parents, if born by reproduction.
    pub parents: Option<(AgentId, AgentId)>,
    /// Children born to this agent.
    pub descendants: BTreeSet<AgentId>,
    /// Cleared the iteration the agent dies.
    pub alive: bool,
}

impl Agent {
    /// Create a living agent from its birth-time data.
    pub fn new(seed: AgentSeed) -> Self {
        Self {
            id: seed.id,
            position: seed.position,
            age: seed.age,
            attachment: seed.profile.attachment,
            wellbeing: seed.profile.wellbeing,
            worldview: seed.worldview,
            social: SocialGraph::new(seed.id),
            cluster_id: None,
            heroism: 0,
            exposure: EliminationExposure::default(),
            ysterofimia: Ysterofimia::new(),
            telomere: seed.telomere,
            parents: seed.parents,
            descendants: BTreeSet::new(),
            alive: true,
        }
    }

    /// Age in iterations.
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Advance age by one iteration.
    pub const fn grow_older(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Number of times this agent volunteered.
    pub const fn heroism(&self) -> u32 {
        self.heroism
    }

    /// Record a volunteering decision.
    pub const fn record_heroism(&mut self) {
        self.heroism = self.heroism.saturating_add(1);
    }

    /// The agent's attachment style.
    pub const fn style(&self) -> AttachmentStyle {
        self.attachment.style
    }

    /// Export view of this agent.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            alive: self.alive,
            age: self.age,
            style: self.attachment.style,
            anxiety: self.attachment.anxiety,
            avoidance: self.attachment.avoidance,
            cluster_id: self.cluster_id,
            position: self.position,
            worldview: WorldviewSummary {
                current: self.worldview.current().unwrap_or(0),
                entries: u32::try_from(self.worldview.len()).unwrap_or(u32::MAX),
            },
            heroism: self.heroism,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Every living agent, keyed by identifier.
///
/// Iteration order is the identifier order, which keeps a seeded run
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Register an agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAgent`] if the identifier is taken.
    pub fn insert(&mut self, agent: Agent) -> Result<(), AgentError> {
        if self.agents.contains_key(&agent.id) {
            return Err(AgentError::DuplicateAgent(agent.id));
        }
        self.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Remove an agent, returning it if it was registered.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Whether an identifier is registered.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Every registered identifier, in order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Every registered agent, in identifier order.
    pub fn all(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Every registered agent, mutably.
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    /// Position of a registered agent.
    pub fn position_of(&self, id: AgentId) -> Option<Position> {
        self.get(id).map(|a| a.position)
    }

    /// Export snapshots of every registered agent.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.all().map(Agent::snapshot).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    /// Build an agent of the given style at a position, for tests across
    /// the crate.
    pub(crate) fn test_agent(style: AttachmentStyle, position: Position, age: u32) -> Agent {
        let mut rng = SmallRng::seed_from_u64(u64::from(age));
        Agent::new(AgentSeed {
            id: AgentId::new(),
            position,
            age,
            profile: StyleProfile::sample(style, &mut rng),
            telomere: Telomere::new(0.001, 0.05, 100),
            worldview: Worldview::from_opinion(0),
            parents: None,
        })
    }

    #[test]
    fn new_agent_is_alive_with_self_entry() {
        let a = test_agent(AttachmentStyle::Secure, Position::new(1, 2), 4);
        assert!(a.alive);
        assert_eq!(a.age(), 4);
        assert_eq!(a.heroism(), 0);
        assert_eq!(a.social.strength(a.id), Some(1.0));
        assert!(a.cluster_id.is_none());
    }

    #[test]
    fn age_and_heroism_only_grow() {
        let mut a = test_agent(AttachmentStyle::Fearful, Position::new(0, 0), 0);
        a.grow_older();
        a.grow_older();
        a.record_heroism();
        assert_eq!(a.age(), 2);
        assert_eq!(a.heroism(), 1);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut a = test_agent(AttachmentStyle::Dismissive, Position::new(3, 3), 7);
        a.cluster_id = Some(2);
        a.worldview.record(0b11);
        let snap = a.snapshot();
        assert_eq!(snap.id, a.id);
        assert_eq!(snap.style, AttachmentStyle::Dismissive);
        assert_eq!(snap.cluster_id, Some(2));
        assert_eq!(snap.worldview.current, 0b11);
        assert_eq!(snap.worldview.entries, 2);
    }

    #[test]
    fn registry_rejects_duplicates_and_tolerates_missing() {
        let mut reg = AgentRegistry::new();
        let a = test_agent(AttachmentStyle::Secure, Position::new(0, 0), 1);
        let id = a.id;
        assert!(reg.insert(a.clone()).is_ok());
        assert!(matches!(reg.insert(a), Err(AgentError::DuplicateAgent(_))));
        assert_eq!(reg.len(), 1);
        assert!(reg.remove(id).is_some());
        assert!(reg.get(id).is_none());
        assert!(reg.remove(id).is_none());
    }
}
