//! Shared type definitions for the TMT attachment simulation.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries and leave the engine through the export interface.
//! Exported types also derive `ts-rs` bindings for the visualiser.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for agent identifiers
//! - [`enums`] -- Attachment styles, decisions, elimination and marker kinds
//! - [`structs`] -- Positions, agent snapshots, and iteration summaries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AspDecision, AttachmentStyle, EliminationKind, MarkerKind};
pub use ids::AgentId;
pub use structs::{AgentSnapshot, DecisionDiagnostic, IterationSummary, Position, WorldviewSummary};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for exported types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings when export_all() is called; the files
        // land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();

        let _ = crate::enums::AttachmentStyle::export_all();
        let _ = crate::enums::AspDecision::export_all();
        let _ = crate::enums::EliminationKind::export_all();
        let _ = crate::enums::MarkerKind::export_all();

        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::WorldviewSummary::export_all();
        let _ = crate::structs::AgentSnapshot::export_all();
        let _ = crate::structs::DecisionDiagnostic::export_all();
        let _ = crate::structs::IterationSummary::export_all();
    }
}
