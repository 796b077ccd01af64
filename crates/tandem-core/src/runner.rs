//! The opaque unit of work executed on behalf of a task

use crate::types::{DevelopmentTask, Mode, ModeConfig};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Strategy invoked by the executor to perform a task's actual work
///
/// The orchestrator core treats the work as opaque: a function of the task,
/// the active mode configuration, and a cancellation token, producing a
/// result payload or an error. Implementations should observe `cancel` at
/// their own checkpoints; the executor additionally races the returned
/// future against the token, so a runner that never checks is still cut
/// off. Implementations must not panic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(
        &self,
        task: &DevelopmentTask,
        config: &ModeConfig,
        cancel: &CancellationToken,
    ) -> anyhow::Result<serde_json::Value>;
}

/// Built-in runner that simulates agent work
///
/// Used until a real agent transport is wired in: sleeps a few short
/// intervals with cancellation checkpoints, then echoes a structured
/// summary of what would have been done.
pub struct SimulatedRunner {
    step_delay: Duration,
}

/// Simulated work is split into this many cancellable steps
const SIMULATED_STEPS: u32 = 4;

impl SimulatedRunner {
    pub fn new() -> Self {
        Self {
            step_delay: Duration::from_millis(25),
        }
    }

    pub fn with_step_delay(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

impl Default for SimulatedRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRunner for SimulatedRunner {
    async fn run(
        &self,
        task: &DevelopmentTask,
        config: &ModeConfig,
        cancel: &CancellationToken,
    ) -> anyhow::Result<serde_json::Value> {
        for _ in 0..SIMULATED_STEPS {
            tokio::select! {
                _ = cancel.cancelled() => anyhow::bail!("cancelled"),
                _ = tokio::time::sleep(self.step_delay) => {}
            }
        }

        let mode_detail = match task.mode {
            Mode::Vibecoding => serde_json::json!({
                "flowPreserved": config.vibecoding.flow_preservation,
                "contextAwareness": config.vibecoding.context_awareness,
            }),
            Mode::SpecCentric => serde_json::json!({
                "requirementsValidated": config.spec_centric.requirement_validation,
                "specificationTracked": config.spec_centric.specification_tracking,
            }),
        };

        Ok(serde_json::json!({
            "summary": format!("Processed prompt under {} mode", task.mode),
            "promptLength": task.prompt.len(),
            "agents": task.required_agents,
            "modeDetail": mode_detail,
        }))
    }
}
