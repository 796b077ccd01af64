//! Error types for Tandem Core

use thiserror::Error;

/// Main error type for Tandem operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Agent registry errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Agent busy: {0}")]
    Busy(String),

    #[error("Reservation unknown or already released: {0}")]
    StaleReservation(uuid::Uuid),
}

/// Task submission errors
///
/// These are raised before any agent is touched; a task that fails with one
/// of these leaves no trace in the registry or the history log.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task prompt is empty")]
    EmptyPrompt,

    #[error("Task requires no agents: {0}")]
    NoRequiredAgents(String),

    #[error("Task requires unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Task already in flight: {0}")]
    DuplicateTask(String),
}

/// Mode configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Value out of range for {field}: {value} (expected {min}..={max})")]
    ValueOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
