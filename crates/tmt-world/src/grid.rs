//! The bounded lattice: occupancy index, memorial markers, and move queries.
//!
//! Coordinates run from `0` to `width - 1` and `0` to `height - 1`. Movement
//! uses the 8-neighbourhood (Moore neighbourhood) and is only legal into an
//! in-bounds, unoccupied cell. Markers do not block movement.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::IndexedRandom;
use tmt_types::{AgentId, MarkerKind, Position};
use tracing::debug;

use crate::error::WorldError;

/// Number of random probes made before [`Grid::random_free_cell`] falls back
/// to scanning every cell.
const FREE_CELL_PROBES: u32 = 64;

/// Offsets of the 8-neighbourhood, in a fixed order.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Spatial index of agents and memorials.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Number of columns.
    width: i32,
    /// Number of rows.
    height: i32,
    /// Agent occupying each non-empty cell.
    occupancy: BTreeMap<Position, AgentId>,
    /// Cells where an agent died naturally or was eliminated by force.
    tombstones: BTreeSet<Position>,
    /// Cells where an agent sacrificed itself.
    temples: BTreeSet<Position>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or does not fit the signed coordinate space.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let invalid = || WorldError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let w = i32::try_from(width).ok().ok_or_else(invalid)?;
        let h = i32::try_from(height).ok().ok_or_else(invalid)?;
        Ok(Self {
            width: w,
            height: h,
            occupancy: BTreeMap::new(),
            tombstones: BTreeSet::new(),
            temples: BTreeSet::new(),
        })
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        let w = usize::try_from(self.width).unwrap_or(0);
        let h = usize::try_from(self.height).unwrap_or(0);
        w.saturating_mul(h)
    }

    /// Whether a position lies inside the grid.
    pub const fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    /// Clamp a position into the grid bounds.
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0, self.width.saturating_sub(1)),
            position.y.clamp(0, self.height.saturating_sub(1)),
        )
    }

    // -------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------

    /// The agent occupying a cell, if any.
    pub fn occupant(&self, position: Position) -> Option<AgentId> {
        self.occupancy.get(&position).copied()
    }

    /// Whether a cell holds an agent.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupancy.contains_key(&position)
    }

    /// Number of occupied cells.
    pub fn agent_count(&self) -> usize {
        self.occupancy.len()
    }

    /// Place an agent on an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::CellOccupied`].
    pub fn place(&mut self, agent: AgentId, position: Position) -> Result<(), WorldError> {
        if !self.in_bounds(position) {
            return Err(WorldError::OutOfBounds(position));
        }
        if let Some(occupant) = self.occupant(position) {
            return Err(WorldError::CellOccupied { position, occupant });
        }
        self.occupancy.insert(position, agent);
        Ok(())
    }

    /// Remove whatever agent occupies a cell.
    pub fn vacate(&mut self, position: Position) -> Option<AgentId> {
        self.occupancy.remove(&position)
    }

    /// Move an agent between two cells.
    ///
    /// Moving onto the current cell is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotAt`] if `agent` is not at `from`, or the
    /// errors of [`Grid::place`] for the destination.
    pub fn move_agent(
        &mut self,
        agent: AgentId,
        from: Position,
        to: Position,
    ) -> Result<(), WorldError> {
        if self.occupant(from) != Some(agent) {
            return Err(WorldError::AgentNotAt {
                agent,
                position: from,
            });
        }
        if from == to {
            return Ok(());
        }
        self.place(agent, to)?;
        self.occupancy.remove(&from);
        Ok(())
    }

    /// Pick a uniformly random free cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::GridFull`] if no cell is free.
    pub fn random_free_cell(&self, rng: &mut impl Rng) -> Result<Position, WorldError> {
        if self.agent_count() >= self.capacity() {
            return Err(WorldError::GridFull);
        }
        for _ in 0..FREE_CELL_PROBES {
            let candidate = Position::new(
                rng.random_range(0..self.width),
                rng.random_range(0..self.height),
            );
            if !self.is_occupied(candidate) {
                return Ok(candidate);
            }
        }
        // Dense grid: enumerate instead of probing.
        let free: Vec<Position> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .filter(|p| !self.is_occupied(*p))
            .collect();
        free.choose(rng).copied().ok_or(WorldError::GridFull)
    }

    // -------------------------------------------------------------------
    // Movement queries
    // -------------------------------------------------------------------

    /// In-bounds, unoccupied cells adjacent to `from`.
    pub fn legal_moves(&self, from: Position) -> Vec<Position> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|(dx, dy)| Position::new(from.x.saturating_add(*dx), from.y.saturating_add(*dy)))
            .filter(|p| self.in_bounds(*p) && !self.is_occupied(*p))
            .collect()
    }

    /// The best single step from `from` toward `target`.
    ///
    /// The target is clamped into the grid first. Returns `from` itself when
    /// no legal neighbour is strictly closer to the target.
    pub fn step_toward(&self, from: Position, target: Position) -> Position {
        let goal = self.clamp(target);
        let mut best = from;
        let mut best_distance = from.distance(goal);
        for candidate in self.legal_moves(from) {
            let d = candidate.distance(goal);
            if d < best_distance {
                best = candidate;
                best_distance = d;
            }
        }
        best
    }

    /// A uniformly random legal step, or `from` when boxed in.
    pub fn step_random(&self, from: Position, rng: &mut impl Rng) -> Position {
        self.legal_moves(from).choose(rng).copied().unwrap_or(from)
    }

    // -------------------------------------------------------------------
    // Markers
    // -------------------------------------------------------------------

    /// Record a permanent marker at a cell.
    pub fn place_marker(&mut self, kind: MarkerKind, position: Position) {
        debug!(?kind, %position, "Marker placed");
        match kind {
            MarkerKind::Tombstone => {
                self.tombstones.insert(position);
            }
            MarkerKind::Temple => {
                self.temples.insert(position);
            }
        }
    }

    /// All tombstone cells.
    pub const fn tombstones(&self) -> &BTreeSet<Position> {
        &self.tombstones
    }

    /// All temple cells.
    pub const fn temples(&self) -> &BTreeSet<Position> {
        &self.temples
    }

    /// Every memorial cell, tombstones first.
    pub fn memorials(&self) -> impl Iterator<Item = Position> + '_ {
        self.tombstones.iter().chain(self.temples.iter()).copied()
    }
}
