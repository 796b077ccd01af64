//! Core type definitions for Tandem
//!
//! This module contains the shared data model used across the orchestrator:
//! agent identity and status, development modes and their configuration
//! bundles, task and result records, and user preference types.

mod agent_types;
mod mode_types;
mod preference_types;
mod task_types;

pub use agent_types::*;
pub use mode_types::*;
pub use preference_types::*;
pub use task_types::*;
