//! The population-dynamics engine.
//!
//! [`PopulationEngine`] owns all mutable simulation state (grid, agent
//! registry, random source, expected-children parameter) and exposes the
//! three hooks a host scheduler drives:
//!
//! 1. [`PopulationEngine::initialize`] seeds the population once.
//! 2. [`PopulationEngine::run_movement_turn`] moves every agent one step.
//! 3. [`PopulationEngine::run_population_dynamics`] runs the end-of-iteration
//!    pass and returns an [`IterationSummary`].
//!
//! The end-of-iteration pass runs these phases strictly in order:
//!
//! 1. Clustering: k-means over living positions.
//! 2. Mortality: one telomere draw per agent; the dead are buried.
//! 3. Decision: every survivor is adjudicated.
//! 4. Quota: `ceil(rho * living)` agents are eliminated, volunteers first,
//!    with forced eliminations covering a shortfall. Only a volunteer that
//!    is actually taken gains heroism.
//! 5. Network evolution within each cluster.
//! 6. Wellbeing-check protocol within each cluster.
//! 7. Aging and worldview drift for survivors.
//! 8. Expected-children drift and reproduction. Every departure opens one
//!    breeding slot, filled by a random survivor; the filled pool is paired
//!    and each child is tied to its living parents.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tmt_agents::decision::DecisionContext;
use tmt_agents::reproduction::{
    adjust_expected_children, pair_parents, sample_child_count, sample_child_style,
};
use tmt_agents::social::{MAX_NEW_TIE_STRENGTH, MIN_NEW_TIE_STRENGTH};
use tmt_agents::worldview::crossover;
use tmt_agents::{
    Agent, AgentError, AgentRegistry, AgentSeed, DecisionConfig, StyleDistribution, StyleProfile,
    Telomere, TieEvent, Worldview, adjudicate, run_wellbeing_round,
};
use tmt_types::{
    AgentId, AgentSnapshot, AttachmentStyle, DecisionDiagnostic, EliminationKind,
    IterationSummary, Position,
};
use tmt_world::{Grid, WorldError};
use tracing::{debug, info, warn};

use crate::clustering::{Clustering, kmeans};
use crate::config::{ConfigError, SimulationConfig};
use crate::movement;

/// Errors that can occur while driving the population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// An agent operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Outcome of the quota phase.
#[derive(Debug, Default)]
struct QuotaOutcome {
    required: u32,
    voluntary: Vec<AgentId>,
    forced: Vec<AgentId>,
}

/// Owner of all simulation state for one run.
#[derive(Debug)]
pub struct PopulationEngine {
    config: SimulationConfig,
    decision: DecisionConfig,
    telomere: Telomere,
    grid: Grid,
    registry: AgentRegistry,
    clustering: Clustering,
    rng: StdRng,
    expected_children: f64,
    iteration: u32,
}

impl PopulationEngine {
    /// Create an empty engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::Config`] if the configuration is invalid,
    /// or [`PopulationError::World`] if the grid cannot be built.
    pub fn new(config: SimulationConfig) -> Result<Self, PopulationError> {
        config.validate()?;
        let grid = Grid::new(config.world.width, config.world.height)?;
        Ok(Self {
            decision: config.decision_config(),
            telomere: config.telomere(),
            rng: StdRng::seed_from_u64(config.world.seed),
            expected_children: config.population.initial_expected_children,
            grid,
            registry: AgentRegistry::new(),
            clustering: Clustering::default(),
            iteration: 0,
            config,
        })
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The configuration this engine runs with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Every living agent.
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Look up a living agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.registry.get(id)
    }

    /// The most recent clustering.
    pub const fn clustering(&self) -> &Clustering {
        &self.clustering
    }

    /// Current expected children per pair.
    pub const fn expected_children(&self) -> f64 {
        self.expected_children
    }

    /// Index of the next iteration to run.
    pub const fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Number of living agents.
    pub fn population(&self) -> usize {
        self.registry.len()
    }

    /// Export snapshots of every living agent.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.registry.snapshots()
    }

    // -------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------

    /// Place an agent on the grid and register it.
    ///
    /// # Errors
    ///
    /// Returns a grid error if its cell is taken or out of bounds, or
    /// [`AgentError::DuplicateAgent`].
    pub fn add_agent(&mut self, agent: Agent) -> Result<(), PopulationError> {
        if self.registry.contains(agent.id) {
            return Err(AgentError::DuplicateAgent(agent.id).into());
        }
        self.grid.place(agent.id, agent.position)?;
        self.registry.insert(agent)?;
        Ok(())
    }

    /// Seed the initial population and compute its first clustering.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError`] if the style proportions cannot form a
    /// distribution or the grid runs out of cells.
    pub fn initialize(&mut self) -> Result<(), PopulationError> {
        let population = &self.config.population;
        let styles = StyleDistribution::new(population.proportions.as_weights())?;
        let count = population.initial_agents;
        let age_max = population.seed_age_max;

        for _ in 0..count {
            let style = styles.sample(&mut self.rng);
            let position = self.grid.random_free_cell(&mut self.rng)?;
            let age = if age_max > 0 {
                self.rng.random_range(0..age_max)
            } else {
                0
            };
            let agent = Agent::new(AgentSeed {
                id: AgentId::from_random_bytes(self.rng.random()),
                position,
                age,
                profile: StyleProfile::sample(style, &mut self.rng),
                telomere: self.telomere,
                worldview: Worldview::from_opinion(self.rng.random()),
                parents: None,
            });
            self.add_agent(agent)?;
        }

        for id in self.registry.ids() {
            self.bootstrap_ties(id);
        }
        self.recluster();

        info!(
            agents = self.registry.len(),
            clusters = self.clustering.len(),
            width = self.grid.width(),
            height = self.grid.height(),
            "Population seeded"
        );
        Ok(())
    }

    /// Give an agent outgoing ties to every other living agent, each with
    /// the connection probability, and the same chance of an incoming tie
    /// from each.
    fn bootstrap_ties(&mut self, id: AgentId) {
        let p = self.config.population.connection_probability;
        for other in self.registry.ids() {
            if other == id {
                continue;
            }
            if self.rng.random_bool(p) {
                let s = self.sample_tie_strength();
                if let Some(agent) = self.registry.get_mut(id) {
                    agent.social.insert_tie(other, s);
                }
            }
            if self.rng.random_bool(p) {
                let s = self.sample_tie_strength();
                if let Some(agent) = self.registry.get_mut(other) {
                    agent.social.insert_tie(id, s);
                }
            }
        }
    }

    fn sample_tie_strength(&mut self) -> f64 {
        self.rng.random_range(MIN_NEW_TIE_STRENGTH..=MAX_NEW_TIE_STRENGTH)
    }

    // -------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------

    /// Move every agent one step according to its style's policy.
    ///
    /// Returns the number of agents that changed cell.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::World`] if the grid and registry disagree.
    pub fn run_movement_turn(&mut self, turn: u32) -> Result<u32, PopulationError> {
        let moved = movement::move_agents(&mut self.grid, &mut self.registry, &mut self.rng)?;
        debug!(iteration = self.iteration, turn, moved, "Movement turn complete");
        Ok(moved)
    }

    // -------------------------------------------------------------------
    // End-of-iteration pass
    // -------------------------------------------------------------------

    /// Run the end-of-iteration population-dynamics pass.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError`] only if internal state is inconsistent
    /// (an agent's recorded cell does not hold it). A full grid stops
    /// reproduction early with a warning instead of failing.
    #[allow(clippy::too_many_lines)]
    pub fn run_population_dynamics(&mut self) -> Result<IterationSummary, PopulationError> {
        let iteration = self.iteration;
        let population_before = count_u32(self.registry.len());
        info!(iteration, population = population_before, "Population dynamics started");

        // --- Phase 1: Clustering ---
        self.recluster();

        // --- Phase 2: Mortality ---
        let mut departures = 0_usize;
        let natural_deaths = self.draw_natural_deaths();
        for id in &natural_deaths {
            if self.bury(*id, EliminationKind::Natural)?.is_some() {
                departures = departures.saturating_add(1);
            }
        }

        // --- Phase 3: Decision ---
        let diagnostics = self.adjudicate_all();
        let volunteers: Vec<AgentId> = diagnostics
            .iter()
            .filter(|d| d.decision.is_volunteer())
            .map(|d| d.agent_id)
            .collect();

        // --- Phase 4: Quota ---
        let living = self.registry.len();
        let quota = self.select_eliminations(&diagnostics, living);
        for id in &quota.voluntary {
            if let Some(agent) = self.registry.get_mut(*id) {
                agent.record_heroism();
            }
            if self.bury(*id, EliminationKind::Voluntary)?.is_some() {
                departures = departures.saturating_add(1);
            }
        }
        for id in &quota.forced {
            if self.bury(*id, EliminationKind::Forced)?.is_some() {
                departures = departures.saturating_add(1);
            }
        }
        info!(
            iteration,
            volunteers = volunteers.len(),
            required = quota.required,
            voluntary = quota.voluntary.len(),
            forced = quota.forced.len(),
            "Elimination quota applied"
        );

        // --- Phase 5 + 6: Networks and wellbeing, per cluster ---
        for (cluster, members) in self.living_cluster_groups().into_iter().enumerate() {
            self.evolve_network(&members);
            let stats = run_wellbeing_round(&mut self.registry, &members, &mut self.rng);
            debug!(
                iteration,
                cluster,
                members = members.len(),
                checks = stats.checks,
                replies = stats.replies,
                decayed = stats.decayed,
                "Cluster wellbeing round complete"
            );
        }

        // --- Phase 7: Aging and worldview drift ---
        let drift = self.config.worldview.drift_probability;
        for agent in self.registry.all_mut() {
            agent.grow_older();
            agent.worldview.drift(drift, &mut self.rng);
        }

        // --- Phase 8: Reproduction ---
        let realized = share(quota.voluntary.len(), living);
        self.expected_children = adjust_expected_children(
            self.expected_children,
            realized,
            self.config.population.rho,
            self.config.fertility_bounds(),
        );
        let spawned = self.reproduce(departures)?;

        let summary = IterationSummary {
            iteration,
            population_before,
            population_after: count_u32(self.registry.len()),
            natural_deaths,
            eliminated: quota
                .voluntary
                .iter()
                .chain(quota.forced.iter())
                .copied()
                .collect(),
            self_sacrificed: quota.voluntary,
            volunteers: count_u32(volunteers.len()),
            required_eliminations: quota.required,
            spawned,
            expected_children: self.expected_children,
            tombstones: self.grid.tombstones().iter().copied().collect(),
            temples: self.grid.temples().iter().copied().collect(),
            diagnostics,
        };
        info!(
            iteration,
            population_before = summary.population_before,
            population_after = summary.population_after,
            natural_deaths = summary.natural_deaths.len(),
            eliminated = summary.eliminated.len(),
            spawned = summary.spawned.len(),
            expected_children = summary.expected_children,
            "Population dynamics complete"
        );
        self.iteration = self.iteration.saturating_add(1);
        Ok(summary)
    }

    /// Recompute clusters and write each agent's cluster id.
    fn recluster(&mut self) {
        let points: Vec<(AgentId, Position)> =
            self.registry.all().map(|a| (a.id, a.position)).collect();
        let k = usize::try_from(self.config.clustering.k).unwrap_or(usize::MAX);
        self.clustering = kmeans(
            &points,
            k,
            self.config.clustering.max_iterations,
            &mut self.rng,
        );
        for agent in self.registry.all_mut() {
            agent.cluster_id = self.clustering.cluster_of(agent.id);
        }
    }

    /// Members of each cluster that are still registered.
    fn living_cluster_groups(&self) -> Vec<Vec<AgentId>> {
        self.clustering
            .groups()
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .filter(|id| self.registry.contains(*id))
                    .collect::<Vec<_>>()
            })
            .filter(|members| !members.is_empty())
            .collect()
    }

    fn draw_natural_deaths(&mut self) -> Vec<AgentId> {
        let mut dead = Vec::new();
        for agent in self.registry.all() {
            if agent.telomere.sample_death(agent.age(), &mut self.rng) {
                dead.push(agent.id);
            }
        }
        dead
    }

    fn adjudicate_all(&self) -> Vec<DecisionDiagnostic> {
        let memorials: Vec<Position> = self.grid.memorials().collect();
        let ctx = DecisionContext {
            registry: &self.registry,
            memorials: &memorials,
        };
        self.registry
            .all()
            .map(|agent| adjudicate(agent, &ctx, &self.decision))
            .collect()
    }

    /// Pick who is eliminated to satisfy `ceil(rho * living)`.
    ///
    /// With enough volunteers, a random subset of them fills the quota.
    /// Otherwise every volunteer goes, plus up to twice the shortfall in
    /// random non-volunteers.
    fn select_eliminations(
        &mut self,
        diagnostics: &[DecisionDiagnostic],
        living: usize,
    ) -> QuotaOutcome {
        let required = required_eliminations(self.config.population.rho, living);
        let mut volunteers = Vec::new();
        let mut others = Vec::new();
        for d in diagnostics {
            if d.decision.is_volunteer() {
                volunteers.push(d.agent_id);
            } else {
                others.push(d.agent_id);
            }
        }
        volunteers.shuffle(&mut self.rng);
        let required_len = usize::try_from(required).unwrap_or(usize::MAX);

        if volunteers.len() >= required_len {
            volunteers.truncate(required_len);
            return QuotaOutcome {
                required,
                voluntary: volunteers,
                forced: Vec::new(),
            };
        }
        let shortfall = required_len.saturating_sub(volunteers.len());
        others.shuffle(&mut self.rng);
        others.truncate(shortfall.saturating_mul(2));
        QuotaOutcome {
            required,
            voluntary: volunteers,
            forced: others,
        }
    }

    /// Remove a dead agent from the world and settle survivors' books.
    ///
    /// Every survivor forgets its tie to the deceased and records the
    /// esteem in its ysterofimia ledger. Any death, natural or not, raises
    /// cluster-mates' and network peers' exposure. Returns `None` for an
    /// identifier that is already gone.
    fn bury(
        &mut self,
        id: AgentId,
        kind: EliminationKind,
    ) -> Result<Option<Agent>, PopulationError> {
        let Some(mut agent) = self.registry.remove(id) else {
            return Ok(None);
        };
        agent.alive = false;
        if self.grid.vacate(agent.position) != Some(id) {
            return Err(WorldError::AgentNotAt {
                agent: id,
                position: agent.position,
            }
            .into());
        }
        self.grid.place_marker(kind.marker(), agent.position);

        for survivor in self.registry.all_mut() {
            if let Some(esteem) = survivor.social.forget(id) {
                survivor.ysterofimia.record_death(kind.is_voluntary(), esteem);
                survivor.exposure.network = survivor.exposure.network.saturating_add(1);
            }
            if survivor.cluster_id.is_some() && survivor.cluster_id == agent.cluster_id {
                survivor.exposure.cluster = survivor.exposure.cluster.saturating_add(1);
            }
        }
        debug!(agent_id = %id, %kind, position = %agent.position, "Agent removed");
        Ok(Some(agent))
    }

    /// Create and sever ties between every ordered pair in a cluster.
    fn evolve_network(&mut self, members: &[AgentId]) {
        for &a in members {
            for &b in members {
                if a == b {
                    continue;
                }
                let Some(source) = self.registry.get(a) else {
                    continue;
                };
                let connected = source.social.is_connected(b);
                let anxiety = source.attachment.anxiety;
                let avoidance = source.attachment.avoidance;

                let event = if connected {
                    self.rng
                        .random_bool(avoidance.clamp(0.0, 1.0))
                        .then_some(TieEvent::Severed)
                } else {
                    self.rng
                        .random_bool(anxiety.clamp(0.0, 1.0))
                        .then_some(TieEvent::Created)
                };
                let Some(event) = event else {
                    continue;
                };
                let strength = self.sample_tie_strength();
                let applied = self.registry.get_mut(a).is_some_and(|agent| match event {
                    TieEvent::Created => agent.social.form_tie(b, strength),
                    TieEvent::Severed => agent.social.sever_tie(b).is_some(),
                });
                if applied {
                    if let Some(peer) = self.registry.get_mut(b) {
                        peer.social.note_received(event);
                    }
                    debug!(from = %a, to = %b, ?event, "Tie changed");
                }
            }
        }
    }

    /// Spawn children into the breeding slots opened by `departures`.
    ///
    /// The departed are already purged from every network, so each slot is
    /// filled by a distinct random survivor. Parents pass on style and
    /// worldview, record the child as a descendant, and get a starter tie
    /// from it.
    fn reproduce(&mut self, departures: usize) -> Result<Vec<AgentId>, PopulationError> {
        let mut pool = self.registry.ids();
        pool.shuffle(&mut self.rng);
        pool.truncate(departures);
        let pairs = pair_parents(
            pool,
            self.config.population.clone_unpaired_parent,
            &mut self.rng,
        );
        let mut spawned = Vec::new();

        for (a, b) in pairs {
            let (Some(parent_a), Some(parent_b)) =
                (self.parent_traits(a), self.parent_traits(b))
            else {
                continue;
            };
            let children = sample_child_count(self.expected_children, &mut self.rng)?;
            for _ in 0..children {
                let position = match self.grid.random_free_cell(&mut self.rng) {
                    Ok(p) => p,
                    Err(WorldError::GridFull) => {
                        warn!(spawned = spawned.len(), "Grid full, reproduction stopped");
                        return Ok(spawned);
                    }
                    Err(e) => return Err(e.into()),
                };
                let child = self.spawn_child(parent_a, parent_b, position)?;
                spawned.push(child);
            }
        }
        Ok(spawned)
    }

    /// What a living agent passes on to a child.
    fn parent_traits(&self, id: AgentId) -> Option<ParentTraits> {
        self.registry.get(id).map(|agent| ParentTraits {
            id,
            style: agent.style(),
            opinion: agent.worldview.current().unwrap_or(0),
        })
    }

    /// Create one child of two parents at a free cell.
    fn spawn_child(
        &mut self,
        parent_a: ParentTraits,
        parent_b: ParentTraits,
        position: Position,
    ) -> Result<AgentId, PopulationError> {
        let style = sample_child_style(
            parent_a.style,
            parent_b.style,
            self.config.population.mutation_rate,
            &mut self.rng,
        )?;
        let opinion = crossover(parent_a.opinion, parent_b.opinion, &mut self.rng);
        let id = AgentId::from_random_bytes(self.rng.random());
        let mut child = Agent::new(AgentSeed {
            id,
            position,
            age: 0,
            profile: StyleProfile::sample(style, &mut self.rng),
            telomere: self.telomere,
            worldview: Worldview::from_opinion(opinion),
            parents: Some((parent_a.id, parent_b.id)),
        });
        child.cluster_id = self.clustering.nearest(position);

        for parent in [parent_a.id, parent_b.id] {
            if child.social.is_connected(parent) {
                continue;
            }
            let Some(p) = self.registry.get_mut(parent) else {
                continue;
            };
            p.descendants.insert(id);
            let s = self.sample_tie_strength();
            child.social.insert_tie(parent, s);
        }

        self.add_agent(child)?;
        self.bootstrap_ties(id);
        debug!(
            child = %id,
            parent_a = %parent_a.id,
            parent_b = %parent_b.id,
            %style,
            %position,
            "Child spawned"
        );
        Ok(id)
    }
}

/// Heritable state copied out of a parent before its child is built.
#[derive(Debug, Clone, Copy)]
struct ParentTraits {
    id: AgentId,
    style: AttachmentStyle,
    opinion: u32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slack subtracted before rounding the quota up, so products such as
/// `0.14 * 100 = 14.000000000000002` are not pushed to the next integer.
const QUOTA_EPSILON: f64 = 1e-9;

/// `ceil(rho * living)`, clamped to the living count.
pub fn required_eliminations(rho: f64, living: usize) -> u32 {
    let n = count_u32(living);
    let raw = rho
        .clamp(0.0, 1.0)
        .mul_add(f64::from(n), -QUOTA_EPSILON)
        .ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let required = raw.clamp(0.0, f64::from(n)) as u32;
    required
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(count_u32(part)) / f64::from(count_u32(whole))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tmt_agents::{Agent, AgentSeed, StyleProfile, Telomere, Worldview};

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.width = 12;
        config.world.height = 12;
        config.population.initial_agents = 20;
        config
    }

    fn engine(config: SimulationConfig) -> PopulationEngine {
        let mut e = PopulationEngine::new(config).unwrap();
        e.initialize().unwrap();
        e
    }

    #[test]
    fn required_eliminations_rounds_up() {
        assert_eq!(required_eliminations(0.2, 40), 8);
        assert_eq!(required_eliminations(0.2, 41), 9);
        assert_eq!(required_eliminations(0.0, 40), 0);
        assert_eq!(required_eliminations(1.0, 3), 3);
        assert_eq!(required_eliminations(0.5, 0), 0);
    }

    #[test]
    fn required_eliminations_ignores_float_noise() {
        let cases = [
            (0.07, 100, 7),
            (0.14, 100, 14),
            (0.29, 100, 29),
            (0.1, 30, 3),
            (0.3, 10, 3),
            (0.57, 100, 57),
            (0.07, 101, 8),
        ];
        for (rho, living, expected) in cases {
            assert_eq!(
                required_eliminations(rho, living),
                expected,
                "rho={rho} living={living}"
            );
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = small_config();
        config.population.proportions.fearful = 0.9;
        assert!(matches!(
            PopulationEngine::new(config),
            Err(PopulationError::Config { .. })
        ));
    }

    #[test]
    fn seeding_places_every_agent() {
        let e = engine(small_config());
        assert_eq!(e.population(), 20);
        assert_eq!(e.grid().agent_count(), 20);
        for agent in e.registry().all() {
            assert_eq!(e.grid().occupant(agent.position), Some(agent.id));
            assert!(agent.age() < 50);
            assert!(agent.cluster_id.is_some());
            assert_eq!(agent.social.strength(agent.id), Some(1.0));
        }
    }

    #[test]
    fn seeding_is_deterministic_for_a_seed() {
        let a = engine(small_config());
        let b = engine(small_config());
        assert_eq!(a.registry().ids(), b.registry().ids());
        assert_eq!(a.snapshots(), b.snapshots());
    }

    #[test]
    fn movement_keeps_grid_and_registry_in_sync() {
        let mut e = engine(small_config());
        for turn in 0..5 {
            e.run_movement_turn(turn).unwrap();
        }
        assert_eq!(e.grid().agent_count(), e.population());
        for agent in e.registry().all() {
            assert_eq!(e.grid().occupant(agent.position), Some(agent.id));
        }
    }

    #[test]
    fn iteration_accounts_for_every_agent() {
        let mut e = engine(small_config());
        let summary = e.run_population_dynamics().unwrap();
        let removed = summary.natural_deaths.len() + summary.eliminated.len();
        assert_eq!(
            summary.population_after as usize,
            summary.population_before as usize - removed + summary.spawned.len()
        );
        assert_eq!(e.population(), summary.population_after as usize);
        assert_eq!(e.grid().agent_count(), e.population());
        assert!(e.grid().tombstones().len() + e.grid().temples().len() <= removed);
        assert_eq!(e.iteration(), 1);
    }

    #[test]
    fn dead_agents_leave_no_ties_behind() {
        let mut e = engine(small_config());
        let summary = e.run_population_dynamics().unwrap();
        for dead in summary.natural_deaths.iter().chain(&summary.eliminated) {
            assert!(e.agent(*dead).is_none());
            for agent in e.registry().all() {
                assert!(!agent.social.is_connected(*dead));
            }
        }
    }

    #[test]
    fn voluntary_eliminations_leave_temples() {
        let mut config = small_config();
        // Every score lands above a zero threshold: everyone volunteers.
        config.decision.threshold = 0.0;
        config.telomere.alpha = 0.0;
        let mut e = engine(config);
        let summary = e.run_population_dynamics().unwrap();
        assert_eq!(summary.required_eliminations, 4);
        assert_eq!(summary.self_sacrificed.len(), 4);
        assert_eq!(summary.eliminated.len(), 4);
        assert!(!summary.temples.is_empty());
        assert!(summary.tombstones.is_empty());
    }

    #[test]
    fn scalars_stay_in_unit_interval_over_iterations() {
        let mut e = engine(small_config());
        for _ in 0..5 {
            for turn in 0..3 {
                e.run_movement_turn(turn).unwrap();
            }
            e.run_population_dynamics().unwrap();
            for agent in e.registry().all() {
                assert!((0.0..=1.0).contains(&agent.attachment.anxiety));
                assert!((0.0..=1.0).contains(&agent.attachment.avoidance));
                for (_, s) in agent.social.ties() {
                    assert!((0.0..=1.0).contains(&s));
                }
            }
        }
    }

    #[test]
    fn only_volunteers_taken_by_the_quota_gain_heroism() {
        let mut config = small_config();
        config.decision.threshold = 0.0;
        config.telomere.alpha = 0.0;
        let mut e = engine(config);
        let summary = e.run_population_dynamics().unwrap();
        assert_eq!(summary.self_sacrificed.len(), 4);
        // The rest of the volunteers were passed over and are still alive.
        assert!(summary.volunteers as usize > summary.self_sacrificed.len());
        for agent in e.registry().all() {
            assert_eq!(agent.heroism(), 0, "agent {}", agent.id);
        }
    }

    fn fabricated(position: Position, age: u32, max_age: u32) -> Agent {
        let mut rng = StdRng::seed_from_u64(u64::from(position.x.unsigned_abs()));
        Agent::new(AgentSeed {
            id: AgentId::from_random_bytes(rng.random()),
            position,
            age,
            profile: StyleProfile::sample(AttachmentStyle::Secure, &mut rng),
            telomere: Telomere::new(0.0, 0.0, max_age),
            worldview: Worldview::from_opinion(0),
            parents: None,
        })
    }

    #[test]
    fn natural_deaths_raise_exposure() {
        let mut config = small_config();
        config.population.rho = 0.0;
        config.clustering.k = 1;
        let mut e = PopulationEngine::new(config).unwrap();

        // Past its maximum age, so the telomere draw is certain.
        let doomed = fabricated(Position::new(0, 0), 5, 1);
        let mut friend = fabricated(Position::new(1, 0), 1, 100);
        let stranger = fabricated(Position::new(11, 11), 1, 100);
        let (doomed_id, friend_id, stranger_id) = (doomed.id, friend.id, stranger.id);
        friend.social.insert_tie(doomed_id, 0.7);
        e.add_agent(doomed).unwrap();
        e.add_agent(friend).unwrap();
        e.add_agent(stranger).unwrap();

        let summary = e.run_population_dynamics().unwrap();
        assert_eq!(summary.natural_deaths, vec![doomed_id]);
        assert!(summary.eliminated.is_empty());

        let friend = e.agent(friend_id).unwrap();
        assert_eq!(friend.exposure.cluster, 1);
        assert_eq!(friend.exposure.network, 1);
        assert_eq!(friend.ysterofimia.observed_deaths(), 1);
        let stranger = e.agent(stranger_id).unwrap();
        assert_eq!(stranger.exposure.cluster, 1);
        assert_eq!(stranger.exposure.network, 0);
    }

    #[test]
    fn add_agent_rejects_occupied_cells() {
        let mut e = PopulationEngine::new(small_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let make = |rng: &mut StdRng| {
            Agent::new(AgentSeed {
                id: AgentId::from_random_bytes(rng.random()),
                position: Position::new(3, 3),
                age: 1,
                profile: StyleProfile::sample(AttachmentStyle::Secure, rng),
                telomere: Telomere::new(0.0, 0.0, 100),
                worldview: Worldview::from_opinion(0),
                parents: None,
            })
        };
        assert!(e.add_agent(make(&mut rng)).is_ok());
        assert!(matches!(
            e.add_agent(make(&mut rng)),
            Err(PopulationError::World { .. })
        ));
    }
}
