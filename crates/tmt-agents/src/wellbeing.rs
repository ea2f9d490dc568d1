//! The wellbeing-check protocol.
//!
//! Messages are a closed set of variants dispatched through one capability
//! trait, [`WellbeingHandler`]. Delivery is a plain function call: the
//! sender's step does not continue until [`deliver`] returns the
//! recipient's answer, so a check and its reply form one blocking round
//! trip with nothing else interleaved for that sender.
//!
//! Per cluster and iteration:
//!
//! 1. Each member decides, with its check probability, whether to check on
//!    every other member.
//! 2. A recipient reinforces its esteem for the sender
//!    (`e += alpha * (1 - e)`) and replies with its reply probability.
//! 3. A reply reinforces the sender's esteem for the replier.
//! 4. Once every check for the cluster has been issued, members that
//!    received none decay esteem for all peers (`e -= beta * e`).
//!
//! Reinforcement only touches existing ties. Messages to identifiers that
//! are no longer registered are dropped silently.

use std::collections::BTreeSet;

use rand::Rng;
use tmt_types::AgentId;
use tracing::debug;

use crate::agent::{Agent, AgentRegistry};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Kinds of protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellbeingMessage {
    /// "Are you well?"
    Check,
    /// Answer to a check.
    Reply,
}

/// A message addressed from one agent to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    /// Sending agent.
    pub from: AgentId,
    /// Receiving agent.
    pub to: AgentId,
    /// The message.
    pub message: WellbeingMessage,
}

/// Capability of receiving wellbeing-protocol messages.
pub trait WellbeingHandler {
    /// Handle a check from `from`, optionally answering with a reply.
    fn handle_check(&mut self, from: AgentId, rng: &mut dyn rand::RngCore) -> Option<Envelope>;

    /// Handle a reply from `from`.
    fn handle_reply(&mut self, from: AgentId);
}

impl WellbeingHandler for Agent {
    fn handle_check(&mut self, from: AgentId, rng: &mut dyn rand::RngCore) -> Option<Envelope> {
        self.social.reinforce(from, self.wellbeing.alpha);
        let reply_probability = self.wellbeing.reply_probability.clamp(0.0, 1.0);
        rng.random_bool(reply_probability).then_some(Envelope {
            from: self.id,
            to: from,
            message: WellbeingMessage::Reply,
        })
    }

    fn handle_reply(&mut self, from: AgentId) {
        self.social.reinforce(from, self.wellbeing.alpha);
    }
}

/// Deliver a message and block until the recipient's handler returns.
///
/// Returns the recipient's answer, if any. Unknown recipients yield `None`.
pub fn deliver(
    registry: &mut AgentRegistry,
    envelope: Envelope,
    rng: &mut dyn rand::RngCore,
) -> Option<Envelope> {
    let recipient = registry.get_mut(envelope.to)?;
    match envelope.message {
        WellbeingMessage::Check => recipient.handle_check(envelope.from, rng),
        WellbeingMessage::Reply => {
            recipient.handle_reply(envelope.from);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol round
// ---------------------------------------------------------------------------

/// Message counts from one cluster's protocol round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WellbeingStats {
    /// Checks delivered.
    pub checks: u32,
    /// Replies delivered.
    pub replies: u32,
    /// Members that received no check and decayed.
    pub decayed: u32,
}

/// Run the protocol once over one cluster.
pub fn run_wellbeing_round(
    registry: &mut AgentRegistry,
    cluster: &[AgentId],
    rng: &mut dyn rand::RngCore,
) -> WellbeingStats {
    let mut stats = WellbeingStats::default();
    let mut checked: BTreeSet<AgentId> = BTreeSet::new();

    for &sender in cluster {
        let Some(check_probability) = registry
            .get(sender)
            .map(|a| a.wellbeing.check_probability.clamp(0.0, 1.0))
        else {
            continue;
        };
        if !rng.random_bool(check_probability) {
            continue;
        }
        for &recipient in cluster {
            if recipient == sender || !registry.contains(recipient) {
                continue;
            }
            let check = Envelope {
                from: sender,
                to: recipient,
                message: WellbeingMessage::Check,
            };
            let answer = deliver(registry, check, rng);
            checked.insert(recipient);
            stats.checks = stats.checks.saturating_add(1);
            if let Some(reply) = answer {
                deliver(registry, reply, rng);
                stats.replies = stats.replies.saturating_add(1);
            }
        }
    }

    for &member in cluster {
        if checked.contains(&member) {
            continue;
        }
        if let Some(agent) = registry.get_mut(member) {
            agent.social.decay(agent.wellbeing.beta);
            stats.decayed = stats.decayed.saturating_add(1);
        }
    }

    debug!(
        members = cluster.len(),
        checks = stats.checks,
        replies = stats.replies,
        decayed = stats.decayed,
        "Wellbeing round complete"
    );
    stats
}
