//! Agent pool management
//!
//! This module handles:
//! - The registry of long-lived agents and their status state machine
//! - All-or-nothing reservation of agent sets for task execution
//! - Status-change notifications for presentation layers

mod registry;
mod reservation;

pub use registry::AgentRegistry;
pub use reservation::{ReleaseOutcome, Reservation};
