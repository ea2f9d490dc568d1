//! Spatial layer for the TMT attachment simulation.
//!
//! The world is a bounded `width x height` lattice holding at most one agent
//! per cell, plus two permanent marker sets (tombstones and temples) that
//! only ever grow. The grid is a passive index: it answers occupancy and
//! legal-move queries and never decides anything on its own.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- The [`Grid`] itself.

pub mod error;
pub mod grid;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::Grid;
