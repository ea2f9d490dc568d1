//! Per-agent social network: weighted ties to peers.
//!
//! Each agent owns a [`SocialGraph`] mapping peer identifiers to an esteem
//! strength in `[0, 1]`. The graph always holds a self-entry at full
//! strength; it is never reported as a peer, never severed, and never
//! decayed.
//!
//! Ties are directed: an agent's graph holds only the ties it formed or was
//! given. Tie creation and severance are attributed to the side that
//! performed them and the side that received them. The four counters feed the
//! estrangement factor of the decision model. Ties removed because a peer
//! died are not attributed to anyone.

use std::collections::BTreeMap;

use tmt_types::AgentId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Strength of the self-entry.
const SELF_STRENGTH: f64 = 1.0;

/// Lower bound of a freshly sampled tie strength.
pub const MIN_NEW_TIE_STRENGTH: f64 = 0.2;

/// Upper bound of a freshly sampled tie strength.
pub const MAX_NEW_TIE_STRENGTH: f64 = 1.0;

// ---------------------------------------------------------------------------
// Tie events
// ---------------------------------------------------------------------------

/// Kinds of attributed tie event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieEvent {
    /// A tie was created.
    Created,
    /// A tie was severed.
    Severed,
}

/// Creation and severance counters split by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TieEvents {
    /// Ties this agent created.
    pub created_performed: u32,
    /// Ties a peer created toward this agent.
    pub created_received: u32,
    /// Ties this agent severed.
    pub severed_performed: u32,
    /// Ties a peer severed from this agent.
    pub severed_received: u32,
}

impl TieEvents {
    /// Total number of recorded events.
    pub const fn total(&self) -> u32 {
        self.created_performed
            .saturating_add(self.created_received)
            .saturating_add(self.severed_performed)
            .saturating_add(self.severed_received)
    }
}

// ---------------------------------------------------------------------------
// SocialGraph
// ---------------------------------------------------------------------------

/// Weighted adjacency from one agent to its peers.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialGraph {
    /// The agent owning this graph.
    owner: AgentId,
    /// Esteem per peer, including the self-entry.
    ties: BTreeMap<AgentId, f64>,
    /// Attributed creation and severance counts.
    events: TieEvents,
}

impl SocialGraph {
    /// Create a graph holding only the owner's self-entry.
    pub fn new(owner: AgentId) -> Self {
        let mut ties = BTreeMap::new();
        ties.insert(owner, SELF_STRENGTH);
        Self {
            owner,
            ties,
            events: TieEvents::default(),
        }
    }

    /// The agent owning this graph.
    pub const fn owner(&self) -> AgentId {
        self.owner
    }

    /// Attributed creation and severance counters.
    pub const fn events(&self) -> TieEvents {
        self.events
    }

    /// Esteem held for a peer, or `None` when unconnected.
    ///
    /// Asking for the owner returns the self-entry.
    pub fn strength(&self, peer: AgentId) -> Option<f64> {
        self.ties.get(&peer).copied()
    }

    /// Whether a tie to `peer` exists. Always `false` for the owner.
    pub fn is_connected(&self, peer: AgentId) -> bool {
        peer != self.owner && self.ties.contains_key(&peer)
    }

    /// Peers and their esteem, excluding the self-entry.
    pub fn ties(&self) -> impl Iterator<Item = (AgentId, f64)> + '_ {
        self.ties
            .iter()
            .filter(|(id, _)| **id != self.owner)
            .map(|(id, s)| (*id, *s))
    }

    /// Peer identifiers, excluding the owner.
    pub fn peers(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.ties().map(|(id, _)| id)
    }

    /// Number of peers, excluding the owner.
    pub fn peer_count(&self) -> usize {
        self.ties.len().saturating_sub(1)
    }

    /// The peer held in highest esteem, ties broken by identifier order.
    pub fn strongest_tie(&self) -> Option<(AgentId, f64)> {
        self.ties().fold(None, |best, (id, s)| match best {
            Some((_, bs)) if bs >= s => best,
            _ => Some((id, s)),
        })
    }

    /// Insert a tie without attributing it to either side.
    ///
    /// Used for seeding and parental starter ties. Returns `false` and
    /// leaves the graph unchanged for the owner or an existing peer.
    pub fn insert_tie(&mut self, peer: AgentId, strength: f64) -> bool {
        if peer == self.owner || self.ties.contains_key(&peer) {
            return false;
        }
        self.ties.insert(peer, strength.clamp(0.0, 1.0));
        true
    }

    /// Create a tie the owner initiated.
    ///
    /// Returns `false` and records nothing when the tie could not be
    /// created.
    pub fn form_tie(&mut self, peer: AgentId, strength: f64) -> bool {
        if !self.insert_tie(peer, strength) {
            return false;
        }
        self.events.created_performed = self.events.created_performed.saturating_add(1);
        true
    }

    /// Remove a tie without attribution, returning the esteem it held.
    ///
    /// Used when a peer dies. The self-entry cannot be removed.
    pub fn forget(&mut self, peer: AgentId) -> Option<f64> {
        if peer == self.owner {
            return None;
        }
        self.ties.remove(&peer)
    }

    /// Sever a tie the owner initiated, returning the esteem it held.
    pub fn sever_tie(&mut self, peer: AgentId) -> Option<f64> {
        let removed = self.forget(peer)?;
        self.events.severed_performed = self.events.severed_performed.saturating_add(1);
        Some(removed)
    }

    /// Record that a peer created or severed a tie toward the owner.
    ///
    /// Ties are directed, so the owner's own adjacency is left unchanged.
    pub const fn note_received(&mut self, event: TieEvent) {
        match event {
            TieEvent::Created => {
                self.events.created_received = self.events.created_received.saturating_add(1);
            }
            TieEvent::Severed => {
                self.events.severed_received = self.events.severed_received.saturating_add(1);
            }
        }
    }

    /// Reinforce esteem for an existing peer: `e += alpha * (1 - e)`.
    ///
    /// Unknown peers and the owner are ignored.
    pub fn reinforce(&mut self, peer: AgentId, alpha: f64) {
        if peer == self.owner {
            return;
        }
        if let Some(esteem) = self.ties.get_mut(&peer) {
            let a = alpha.clamp(0.0, 1.0);
            *esteem = a.mul_add(1.0 - *esteem, *esteem).clamp(0.0, 1.0);
        }
    }

    /// Decay esteem toward zero for every peer: `e -= beta * e`.
    pub fn decay(&mut self, beta: f64) {
        let b = beta.clamp(0.0, 1.0);
        let owner = self.owner;
        for (id, esteem) in &mut self.ties {
            if *id != owner {
                *esteem = (-b).mul_add(*esteem, *esteem).clamp(0.0, 1.0);
            }
        }
    }

    /// Mean esteem across current ties (`0.0` with no peers).
    pub fn mean_esteem(&self) -> f64 {
        let (sum, n) = self
            .ties()
            .fold((0.0_f64, 0_u32), |(sum, n), (_, s)| (sum + s, n.saturating_add(1)));
        if n == 0 { 0.0 } else { sum / f64::from(n) }
    }

    /// Share of tie events that estranged the owner from the network:
    /// ties the owner created plus ties severed from the owner, over all
    /// events. `0.0` with no events.
    pub fn estrangement(&self) -> f64 {
        let total = self.events.total();
        if total == 0 {
            return 0.0;
        }
        let estranging = self
            .events
            .created_performed
            .saturating_add(self.events.severed_received);
        f64::from(estranging) / f64::from(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<AgentId> {
        (0..n).map(|_| AgentId::new()).collect()
    }

    #[test]
    fn new_graph_has_only_self_entry() {
        let me = AgentId::new();
        let g = SocialGraph::new(me);
        assert_eq!(g.peer_count(), 0);
        assert_eq!(g.strength(me), Some(1.0));
        assert!(!g.is_connected(me));
        assert_eq!(g.peers().count(), 0);
    }

    #[test]
    fn cannot_tie_to_self_or_duplicate() {
        let me = AgentId::new();
        let other = AgentId::new();
        let mut g = SocialGraph::new(me);
        assert!(!g.insert_tie(me, 0.5));
        assert!(g.insert_tie(other, 0.5));
        assert!(!g.form_tie(other, 0.7));
        assert_eq!(g.strength(other), Some(0.5));
        assert_eq!(g.events().total(), 0);
    }

    #[test]
    fn strengths_are_clamped() {
        let me = AgentId::new();
        let p = ids(2);
        let mut g = SocialGraph::new(me);
        g.insert_tie(p[0], 1.7);
        g.insert_tie(p[1], -0.3);
        assert_eq!(g.strength(p[0]), Some(1.0));
        assert_eq!(g.strength(p[1]), Some(0.0));
    }

    #[test]
    fn reinforce_moves_toward_one() {
        let me = AgentId::new();
        let p = AgentId::new();
        let mut g = SocialGraph::new(me);
        g.insert_tie(p, 0.5);
        g.reinforce(p, 0.5);
        assert!((g.strength(p).unwrap_or_default() - 0.75).abs() < 1e-12);
        // Unknown peers are not created by reinforcement.
        let stranger = AgentId::new();
        g.reinforce(stranger, 0.9);
        assert_eq!(g.strength(stranger), None);
    }

    #[test]
    fn decay_spares_self_entry() {
        let me = AgentId::new();
        let p = AgentId::new();
        let mut g = SocialGraph::new(me);
        g.insert_tie(p, 0.8);
        g.decay(0.5);
        assert!((g.strength(p).unwrap_or_default() - 0.4).abs() < 1e-12);
        assert_eq!(g.strength(me), Some(1.0));
    }

    #[test]
    fn zero_rates_are_idempotent() {
        let me = AgentId::new();
        let p = ids(3);
        let mut g = SocialGraph::new(me);
        for (i, id) in p.iter().enumerate() {
            g.insert_tie(*id, 0.2 + 0.3 * f64::from(u32::try_from(i).unwrap_or(0)));
        }
        let before = g.clone();
        for _ in 0..50 {
            g.reinforce(p[0], 0.0);
            g.decay(0.0);
        }
        assert_eq!(g, before);
    }

    #[test]
    fn mean_esteem_excludes_self() {
        let me = AgentId::new();
        let p = ids(2);
        let mut g = SocialGraph::new(me);
        assert!(g.mean_esteem().abs() < f64::EPSILON);
        g.insert_tie(p[0], 0.2);
        g.insert_tie(p[1], 0.6);
        assert!((g.mean_esteem() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn strongest_tie_picks_max() {
        let me = AgentId::new();
        let p = ids(3);
        let mut g = SocialGraph::new(me);
        assert!(g.strongest_tie().is_none());
        g.insert_tie(p[0], 0.3);
        g.insert_tie(p[1], 0.9);
        g.insert_tie(p[2], 0.5);
        assert_eq!(g.strongest_tie().map(|(id, _)| id), Some(p[1]));
    }

    #[test]
    fn estrangement_counts_performed_creations_and_received_severances() {
        let me = AgentId::new();
        let p = ids(4);
        let mut g = SocialGraph::new(me);
        assert!(g.estrangement().abs() < f64::EPSILON);
        g.form_tie(p[0], 0.5);
        g.form_tie(p[1], 0.5);
        g.note_received(TieEvent::Created);
        g.sever_tie(p[1]);
        g.note_received(TieEvent::Severed);
        g.note_received(TieEvent::Created);
        // (2 created_performed + 1 severed_received) / 6 events
        assert!((g.estrangement() - 0.5).abs() < 1e-12);
        // Severing a missing tie records nothing.
        assert!(g.sever_tie(p[3]).is_none());
        assert_eq!(g.events().total(), 6);
        assert_eq!(g.peer_count(), 1);
    }

    #[test]
    fn forget_is_unattributed_and_keeps_self() {
        let me = AgentId::new();
        let p = AgentId::new();
        let mut g = SocialGraph::new(me);
        g.insert_tie(p, 0.6);
        assert_eq!(g.forget(p), Some(0.6));
        assert_eq!(g.forget(me), None);
        assert_eq!(g.events().total(), 0);
        assert_eq!(g.strength(me), Some(1.0));
    }
}
