//! Agent identity, status, and utilization metrics

use serde::{Deserialize, Serialize};

/// Agent runtime status
///
/// Transitions: Idle ⇄ Active ⇄ Busy, any state → Error, and Error → Idle
/// through an administrative restart. Busy is only entered through a
/// reservation and only left through its release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Agent is registered but not participating in work
    Idle,
    /// Agent is available and warm
    Active,
    /// Agent is reserved by exactly one in-flight task
    Busy,
    /// Agent faulted; requires an administrative restart
    Error,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// A long-lived worker unit tracked by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: AgentStatus,
    /// Point-in-time CPU gauge, percent
    pub cpu_usage: f32,
    /// Point-in-time memory gauge, MB
    pub memory_usage: u64,
    /// Monotonic count of successfully completed tasks
    pub tasks_completed: u64,
    /// Refreshed on every status mutation
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

impl Agent {
    /// Create a new agent in the given initial status
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        status: AgentStatus,
        cpu_usage: f32,
        memory_usage: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            status,
            cpu_usage,
            memory_usage,
            tasks_completed: 0,
            last_activity: chrono::Utc::now(),
        }
    }

    /// Built-in context agent
    pub fn context() -> Self {
        Self::new(
            "context",
            "Context Agent",
            "Maintains project context and developer intent",
            AgentStatus::Active,
            5.0,
            128,
        )
    }

    /// Built-in code analysis agent
    pub fn analysis() -> Self {
        Self::new(
            "analysis",
            "Code Analysis Agent",
            "Analyzes code quality, patterns, and issues",
            AgentStatus::Active,
            15.0,
            256,
        )
    }

    /// Built-in generation agent
    pub fn generation() -> Self {
        Self::new(
            "generation",
            "Generation Agent",
            "Generates code, tests, and documentation",
            AgentStatus::Idle,
            0.0,
            512,
        )
    }

    /// Built-in validation agent
    pub fn validation() -> Self {
        Self::new(
            "validation",
            "Validation Agent",
            "Validates generated code and ensures quality",
            AgentStatus::Idle,
            0.0,
            128,
        )
    }

    /// Built-in communication agent
    pub fn communication() -> Self {
        Self::new(
            "communication",
            "Communication Agent",
            "Handles external integrations and APIs",
            AgentStatus::Idle,
            0.0,
            64,
        )
    }

    /// The fixed start-up catalog
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::context(),
            Self::analysis(),
            Self::generation(),
            Self::validation(),
            Self::communication(),
        ]
    }
}

/// Change notification emitted by the agent registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A single agent changed status
    StatusChanged { agent_id: String, status: AgentStatus },
    /// A batch transition completed; carries a full snapshot
    ListChanged { agents: Vec<Agent> },
}
