//! Agent registry and status state machine

use super::{ReleaseOutcome, Reservation};
use crate::error::{AgentError, Error, Result};
use crate::types::{Agent, AgentEvent, AgentStatus};
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Buffered events per subscriber before lagging
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owns the set of known agents and their live status and metrics
///
/// The registry is a plain data-owning struct; callers that share it across
/// tasks wrap it in a lock, and reservation atomicity follows from holding
/// that lock across [`reserve`](Self::reserve). Agents are created once at
/// start-up and never destroyed during the process lifetime.
pub struct AgentRegistry {
    agents: HashMap<String, Agent>,
    /// Order of the start-up catalog, for stable listings
    order: Vec<String>,
    active_reservations: HashSet<Uuid>,
    events: broadcast::Sender<AgentEvent>,
}

impl AgentRegistry {
    /// Create a registry populated with the built-in catalog
    pub fn new() -> Self {
        Self::with_agents(Agent::catalog())
    }

    /// Create a registry from an explicit agent set
    pub fn with_agents(agents: Vec<Agent>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let order: Vec<String> = agents.iter().map(|a| a.id.clone()).collect();
        let agents = agents.into_iter().map(|a| (a.id.clone(), a)).collect();

        Self {
            agents,
            order,
            active_reservations: HashSet::new(),
            events,
        }
    }

    /// Subscribe to status-change and list-change events
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Snapshot of all agents in catalog order
    pub fn list(&self) -> Vec<Agent> {
        self.order
            .iter()
            .filter_map(|id| self.agents.get(id).cloned())
            .collect()
    }

    /// Snapshot of a single agent
    pub fn get(&self, id: &str) -> Option<Agent> {
        self.agents.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Snapshot of all agents whose status is not Idle
    pub fn active(&self) -> Vec<Agent> {
        self.list()
            .into_iter()
            .filter(|a| a.status != AgentStatus::Idle)
            .collect()
    }

    /// Atomically reserve a set of agents for one task
    ///
    /// Every requested id must exist and not be Busy; otherwise the whole
    /// reservation fails and no agent status changes. On success each
    /// reserved agent transitions to Busy.
    pub fn reserve(&mut self, ids: &[String]) -> Result<Reservation> {
        let mut unique: Vec<&String> = Vec::with_capacity(ids.len());
        let mut seen = HashSet::new();
        for id in ids {
            if seen.insert(id.as_str()) {
                unique.push(id);
            }
        }

        // Check the full set before mutating anything
        for id in &unique {
            let agent = self
                .agents
                .get(id.as_str())
                .ok_or_else(|| Error::Agent(AgentError::NotFound((*id).clone())))?;
            if agent.status == AgentStatus::Busy {
                return Err(Error::Agent(AgentError::Busy((*id).clone())));
            }
        }

        let now = chrono::Utc::now();
        for id in &unique {
            if let Some(agent) = self.agents.get_mut(id.as_str()) {
                agent.status = AgentStatus::Busy;
                agent.last_activity = now;
            }
        }
        for id in &unique {
            self.emit(AgentEvent::StatusChanged {
                agent_id: (*id).clone(),
                status: AgentStatus::Busy,
            });
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            agent_ids: unique.into_iter().cloned().collect(),
        };
        self.active_reservations.insert(reservation.id);
        self.emit(AgentEvent::ListChanged { agents: self.list() });

        debug!(
            "Reserved agents {:?} ({})",
            reservation.agent_ids, reservation.id
        );
        Ok(reservation)
    }

    /// Release a reservation, reporting the task outcome
    ///
    /// Success returns agents to Active and advances `tasks_completed`;
    /// failure parks them in Error; cancellation returns them to Active
    /// without a completion. Releasing an unknown or already-released
    /// reservation is a benign error and changes nothing.
    pub fn release(&mut self, reservation: Reservation, outcome: ReleaseOutcome) -> Result<()> {
        if !self.active_reservations.remove(&reservation.id) {
            warn!(
                "Ignoring release of unknown or already released reservation {}",
                reservation.id
            );
            return Err(Error::Agent(AgentError::StaleReservation(reservation.id)));
        }

        let status = match outcome {
            ReleaseOutcome::Success | ReleaseOutcome::Cancelled => AgentStatus::Active,
            ReleaseOutcome::Failure => AgentStatus::Error,
        };

        let now = chrono::Utc::now();
        for id in &reservation.agent_ids {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.status = status;
                agent.last_activity = now;
                if outcome == ReleaseOutcome::Success {
                    agent.tasks_completed += 1;
                }
            }
        }
        for id in &reservation.agent_ids {
            self.emit(AgentEvent::StatusChanged {
                agent_id: id.clone(),
                status,
            });
        }
        self.emit(AgentEvent::ListChanged { agents: self.list() });

        debug!(
            "Released agents {:?} ({:?})",
            reservation.agent_ids, outcome
        );
        Ok(())
    }

    /// Administrative status override
    ///
    /// Always legal; used by start/stop/restart operations. Refreshes
    /// `last_activity`.
    pub fn set_status(&mut self, id: &str, status: AgentStatus) -> Result<()> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or_else(|| Error::Agent(AgentError::NotFound(id.to_string())))?;

        info!("Agent {} status override: {:?}", id, status);
        agent.status = status;
        agent.last_activity = chrono::Utc::now();

        self.emit(AgentEvent::StatusChanged {
            agent_id: id.to_string(),
            status,
        });
        Ok(())
    }

    /// Refresh the utilization gauges for an agent
    pub fn record_metrics(&mut self, id: &str, cpu_usage: f32, memory_usage: u64) -> Result<()> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or_else(|| Error::Agent(AgentError::NotFound(id.to_string())))?;

        agent.cpu_usage = cpu_usage;
        agent.memory_usage = memory_usage;
        agent.last_activity = chrono::Utc::now();
        Ok(())
    }

    fn emit(&self, event: AgentEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
