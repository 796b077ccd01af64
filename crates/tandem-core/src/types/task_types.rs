//! Task and result records

use super::Mode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scheduling hint for queued submissions
///
/// Advisory only: a lower-priority task already holding a reservation is
/// never preempted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A unit of requested work bound to a mode and a set of required agents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentTask {
    /// Unique among in-flight tasks
    pub id: String,
    pub prompt: String,
    pub mode: Mode,
    pub priority: TaskPriority,
    /// Agent ids that must all be reservable for the task to run
    pub required_agents: Vec<String>,
    /// Optional caller-supplied payload passed through to the runner
    pub context: Option<serde_json::Value>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl DevelopmentTask {
    /// Create a task with a generated id and default priority
    pub fn new(prompt: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            mode,
            priority: TaskPriority::default(),
            required_agents: Vec::new(),
            context: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_required_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Quick action: generate tests for a file (or the current one)
    pub fn generate_tests(file_path: Option<&str>, mode: Mode) -> Self {
        let prompt = match file_path {
            Some(path) => format!("Generate tests for {path}"),
            None => "Generate tests for the current file".to_string(),
        };
        Self::new(prompt, mode).with_required_agents(["generation", "validation"])
    }

    /// Quick action: refactor a selection (or the current scope)
    pub fn refactor_code(selection: Option<&str>, mode: Mode) -> Self {
        let prompt = match selection {
            Some(sel) => format!("Refactor the following code:\n{sel}"),
            None => "Refactor the current selection".to_string(),
        };
        Self::new(prompt, mode).with_required_agents(["analysis", "generation"])
    }

    /// Quick action: document a target symbol or file
    pub fn add_documentation(target: Option<&str>, mode: Mode) -> Self {
        let prompt = match target {
            Some(target) => format!("Add documentation for {target}"),
            None => "Add documentation for the current file".to_string(),
        };
        Self::new(prompt, mode).with_required_agents(["generation"])
    }

    /// Quick action: optimize code within a scope
    pub fn optimize_code(scope: Option<&str>, mode: Mode) -> Self {
        let prompt = match scope {
            Some(scope) => format!("Optimize the code in {scope}"),
            None => "Optimize the current file".to_string(),
        };
        Self::new(prompt, mode).with_required_agents(["analysis", "generation", "validation"])
    }
}

/// The immutable, retained outcome of a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    /// Wall-clock elapsed, ms
    pub duration_ms: u64,
    /// The agents actually reserved for this task
    pub agents_used: Vec<String>,
}

impl TaskResult {
    /// Successful outcome with a result payload
    pub fn completed(
        task_id: impl Into<String>,
        result: serde_json::Value,
        duration_ms: u64,
        agents_used: Vec<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            success: true,
            result: Some(result),
            error: None,
            duration_ms,
            agents_used,
        }
    }

    /// Failed outcome with an error description
    pub fn failed(
        task_id: impl Into<String>,
        error: impl Into<String>,
        duration_ms: u64,
        agents_used: Vec<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            success: false,
            result: None,
            error: Some(error.into()),
            duration_ms,
            agents_used,
        }
    }

    /// Failed outcome for a task that never reserved any agent
    pub fn rejected(task_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::failed(task_id, error, 0, Vec::new())
    }
}
