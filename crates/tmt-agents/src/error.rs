//! Error types for the tmt-agents crate.
//!
//! Per-agent computations never fail: missing peers, empty networks, and
//! zero denominators all resolve to neutral values. The errors here cover
//! registry bookkeeping and invalid distribution parameters, which are the
//! only places a caller can hand the crate something it cannot use.

use tmt_types::AgentId;

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An agent with the same ID is already registered.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// A sampling distribution could not be built from the given parameters.
    #[error("invalid distribution parameters: {reason}")]
    InvalidDistribution {
        /// Description of the rejected parameters.
        reason: String,
    },
}
