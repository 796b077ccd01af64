//! Reservation handle types

use uuid::Uuid;

/// An exclusive, all-or-nothing hold on a set of agents
///
/// Returned by [`AgentRegistry::reserve`](super::AgentRegistry::reserve) and
/// consumed by [`AgentRegistry::release`](super::AgentRegistry::release).
/// The handle is deliberately not `Clone`: one reservation, one release.
#[derive(Debug)]
pub struct Reservation {
    pub(super) id: Uuid,
    pub(super) agent_ids: Vec<String>,
}

impl Reservation {
    /// The agents held by this reservation
    pub fn agent_ids(&self) -> &[String] {
        &self.agent_ids
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Outcome reported when a reservation is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Work completed; agents return to Active and their completion
    /// counters advance
    Success,
    /// Work failed; agents are parked in Error until restarted
    Failure,
    /// Work was cancelled; agents return to Active without a completion
    Cancelled,
}
