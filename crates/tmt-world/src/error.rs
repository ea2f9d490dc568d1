//! Error types for the `tmt-world` crate.
//!
//! All fallible grid operations return [`WorldError`].

use tmt_types::{AgentId, Position};

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid was created with a zero dimension.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A position lies outside the grid bounds.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    /// The target cell already holds an agent.
    #[error("cell {position} is occupied by {occupant}")]
    CellOccupied {
        /// The contested cell.
        position: Position,
        /// The agent already there.
        occupant: AgentId,
    },

    /// The agent is not at the position the caller claimed.
    #[error("agent {agent} is not at {position}")]
    AgentNotAt {
        /// The agent.
        agent: AgentId,
        /// The claimed position.
        position: Position,
    },

    /// Every cell of the grid is occupied.
    #[error("no free cell left on the grid")]
    GridFull,
}
