//! Task submission, execution, and cancellation

use crate::agent::{AgentRegistry, ReleaseOutcome};
use crate::error::{Error, Result, TaskError};
use crate::history::HistoryLog;
use crate::mode::ModeController;
use crate::runner::TaskRunner;
use crate::types::{DevelopmentTask, TaskResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default wall-clock budget for a single unit of work
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Error string recorded for cancelled tasks
const CANCELLED: &str = "cancelled";

/// Accepts task requests, reserves agents, runs the work, and records
/// outcomes
///
/// Submissions from different callers may run concurrently; agent
/// reservation is the only exclusion zone. Reservation is fail-fast: a
/// conflicting submission gets a failed result back immediately instead of
/// queueing behind the holder.
#[derive(Clone)]
pub struct TaskExecutor {
    registry: Arc<RwLock<AgentRegistry>>,
    mode: Arc<RwLock<ModeController>>,
    history: Arc<Mutex<HistoryLog>>,
    runner: Arc<dyn TaskRunner>,
    in_flight: Arc<Mutex<HashMap<String, CancellationToken>>>,
    task_timeout: Duration,
}

/// Terminal outcome of the unit of work
enum RunOutcome {
    Completed(serde_json::Value),
    Failed(String),
    TimedOut,
    Cancelled,
}

impl TaskExecutor {
    pub fn new(
        registry: Arc<RwLock<AgentRegistry>>,
        mode: Arc<RwLock<ModeController>>,
        history: Arc<Mutex<HistoryLog>>,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            registry,
            mode,
            history,
            runner,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            task_timeout: DEFAULT_TASK_TIMEOUT,
        }
    }

    pub fn with_task_timeout(mut self, task_timeout: Duration) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    /// Submit a task and wait for its result
    ///
    /// Malformed submissions (empty prompt, empty or unknown agent set,
    /// duplicate in-flight id) return an error and leave no trace anywhere.
    /// Reservation conflicts return a failed [`TaskResult`] with zero
    /// duration; the caller decides whether to retry. Once agents are
    /// reserved, release and history append happen exactly once regardless
    /// of cancellation timing.
    pub async fn submit(&self, task: DevelopmentTask) -> Result<TaskResult> {
        let cancel = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains_key(&task.id) {
                return Err(Error::Task(TaskError::DuplicateTask(task.id)));
            }
            in_flight.insert(task.id.clone(), cancel.clone());
        }

        // The completion sequence runs on its own task so that a dropped
        // caller future cannot skip agent release or the history write.
        let executor = self.clone();
        let handle = tokio::spawn(async move { executor.execute(task, cancel).await });

        match handle.await {
            Ok(result) => result,
            Err(err) => Err(Error::Internal(format!("task execution aborted: {err}"))),
        }
    }

    /// Submit several tasks, attempting higher-priority ones first
    ///
    /// Ordering is advisory only: it decides who reserves first, never who
    /// gets preempted.
    pub async fn submit_batch(&self, mut tasks: Vec<DevelopmentTask>) -> Vec<Result<TaskResult>> {
        tasks.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(self.submit(task).await);
        }
        results
    }

    /// Request cancellation of an in-flight task
    ///
    /// Returns true if the task was still queued or executing; false for
    /// unknown or already-completed tasks (a benign no-op).
    pub async fn cancel(&self, task_id: &str) -> bool {
        let in_flight = self.in_flight.lock().await;
        match in_flight.get(task_id) {
            Some(token) => {
                info!("Cancelling task {}", task_id);
                token.cancel();
                true
            }
            None => {
                debug!("Cancel requested for unknown or completed task {}", task_id);
                false
            }
        }
    }

    async fn execute(&self, task: DevelopmentTask, cancel: CancellationToken) -> Result<TaskResult> {
        let outcome = self.execute_inner(&task, &cancel).await;
        self.in_flight.lock().await.remove(&task.id);
        outcome
    }

    async fn execute_inner(
        &self,
        task: &DevelopmentTask,
        cancel: &CancellationToken,
    ) -> Result<TaskResult> {
        // 1. Validate before any agent is touched
        self.validate(task).await?;

        // Cancelled while queued: removed, never executed, no history entry
        if cancel.is_cancelled() {
            info!("Task {} cancelled before reservation", task.id);
            return Ok(TaskResult::rejected(&task.id, CANCELLED));
        }

        // 2. Reserve the full agent set, fail fast on conflict
        let reservation = match self.registry.write().await.reserve(&task.required_agents) {
            Ok(reservation) => reservation,
            Err(err) => {
                debug!("Reservation failed for task {}: {}", task.id, err);
                return Ok(TaskResult::rejected(
                    &task.id,
                    format!("agents unavailable: {err}"),
                ));
            }
        };
        let agents_used = reservation.agent_ids().to_vec();

        info!(
            "Task {} started under {} mode with agents {:?}",
            task.id, task.mode, agents_used
        );

        // 3. Run the unit of work under the timeout and cancellation token
        let config = self.mode.read().await.config();
        let started = Instant::now();
        let run = tokio::select! {
            _ = cancel.cancelled() => RunOutcome::Cancelled,
            run = tokio::time::timeout(self.task_timeout, self.runner.run(task, &config, cancel)) => {
                match run {
                    Ok(Ok(value)) => RunOutcome::Completed(value),
                    // A runner that observed the token reports an error;
                    // fold it back into the cancelled outcome
                    Ok(Err(_)) if cancel.is_cancelled() => RunOutcome::Cancelled,
                    Ok(Err(err)) => RunOutcome::Failed(err.to_string()),
                    Err(_) => RunOutcome::TimedOut,
                }
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        // 4. Release the agents with the outcome
        let release_outcome = match &run {
            RunOutcome::Completed(_) => ReleaseOutcome::Success,
            RunOutcome::Failed(_) | RunOutcome::TimedOut => ReleaseOutcome::Failure,
            RunOutcome::Cancelled => ReleaseOutcome::Cancelled,
        };
        if let Err(err) = self
            .registry
            .write()
            .await
            .release(reservation, release_outcome)
        {
            warn!("Releasing agents for task {} failed: {}", task.id, err);
        }

        // 5. Record the outcome
        let result = match run {
            RunOutcome::Completed(value) => {
                TaskResult::completed(&task.id, value, duration_ms, agents_used)
            }
            RunOutcome::Failed(err) => TaskResult::failed(&task.id, err, duration_ms, agents_used),
            RunOutcome::TimedOut => {
                TaskResult::failed(&task.id, "timed out", duration_ms, agents_used)
            }
            RunOutcome::Cancelled => {
                TaskResult::failed(&task.id, CANCELLED, duration_ms, agents_used)
            }
        };
        self.history.lock().await.append(result.clone());

        info!(
            "Task {} finished: success={} duration={}ms",
            task.id, result.success, result.duration_ms
        );

        // 6. Hand the result back
        Ok(result)
    }

    async fn validate(&self, task: &DevelopmentTask) -> Result<()> {
        if task.prompt.trim().is_empty() {
            return Err(Error::Task(TaskError::EmptyPrompt));
        }
        if task.required_agents.is_empty() {
            return Err(Error::Task(TaskError::NoRequiredAgents(task.id.clone())));
        }

        let registry = self.registry.read().await;
        for id in &task.required_agents {
            if !registry.contains(id) {
                return Err(Error::Task(TaskError::UnknownAgent(id.clone())));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{MockTaskRunner, SimulatedRunner};
    use crate::types::{AgentStatus, Mode, TaskPriority};

    struct Harness {
        registry: Arc<RwLock<AgentRegistry>>,
        history: Arc<Mutex<HistoryLog>>,
        executor: TaskExecutor,
    }

    fn harness(runner: Arc<dyn TaskRunner>) -> Harness {
        let registry = Arc::new(RwLock::new(AgentRegistry::new()));
        let mode = Arc::new(RwLock::new(ModeController::new()));
        let history = Arc::new(Mutex::new(HistoryLog::new()));
        let executor = TaskExecutor::new(
            Arc::clone(&registry),
            mode,
            Arc::clone(&history),
            runner,
        );
        Harness {
            registry,
            history,
            executor,
        }
    }

    fn fast_harness() -> Harness {
        harness(Arc::new(SimulatedRunner::with_step_delay(
            Duration::from_millis(1),
        )))
    }

    fn slow_harness(step_delay: Duration) -> Harness {
        harness(Arc::new(SimulatedRunner::with_step_delay(step_delay)))
    }

    fn task(id: &str, agents: &[&str]) -> DevelopmentTask {
        DevelopmentTask::new("add tests", Mode::Vibecoding)
            .with_id(id)
            .with_required_agents(agents.iter().copied())
    }

    #[tokio::test]
    async fn test_submit_success_scenario() {
        let h = fast_harness();

        let result = h.executor.submit(task("t1", &["generation"])).await.unwrap();

        assert!(result.success);
        assert_eq!(result.agents_used, vec!["generation".to_string()]);

        let agent = h.registry.read().await.get("generation").unwrap();
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.tasks_completed, 1);

        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_task_leaves_no_trace() {
        let h = fast_harness();

        let result = h.executor.submit(task("t1", &["nonexistent"])).await;
        assert!(matches!(
            result,
            Err(Error::Task(TaskError::UnknownAgent(_)))
        ));

        assert!(h.history.lock().await.is_empty());
        let agents = h.registry.read().await.list();
        assert!(agents.iter().all(|a| a.status != AgentStatus::Busy));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let h = fast_harness();
        let mut bad = task("t1", &["generation"]);
        bad.prompt = "   ".to_string();

        let result = h.executor.submit(bad).await;
        assert!(matches!(result, Err(Error::Task(TaskError::EmptyPrompt))));
    }

    #[tokio::test]
    async fn test_empty_agent_set_rejected() {
        let h = fast_harness();
        let result = h.executor.submit(task("t1", &[])).await;
        assert!(matches!(
            result,
            Err(Error::Task(TaskError::NoRequiredAgents(_)))
        ));
    }

    #[tokio::test]
    async fn test_reservation_conflict_returns_failed_result() {
        let h = fast_harness();

        // Occupy the agent directly
        let held = h
            .registry
            .write()
            .await
            .reserve(&["generation".to_string()])
            .unwrap();

        let result = h.executor.submit(task("t1", &["generation"])).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.duration_ms, 0);
        assert!(result.error.unwrap().contains("generation"));

        // Conflicts below the reservation stage leave no history entry
        assert!(h.history.lock().await.is_empty());

        h.registry
            .write()
            .await
            .release(held, ReleaseOutcome::Success)
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_conflict_admits_exactly_one() {
        let h = slow_harness(Duration::from_millis(20));

        let (a, b) = tokio::join!(
            h.executor.submit(task("t1", &["generation"])),
            h.executor.submit(task("t2", &["generation"])),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_ne!(a.success, b.success, "exactly one submission must win");
        let loser = if a.success { &b } else { &a };
        assert_eq!(loser.duration_ms, 0);
        assert!(loser.error.as_ref().unwrap().contains("unavailable"));

        // Only the winner reaches the history log
        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_executing_task() {
        let h = slow_harness(Duration::from_secs(30));

        let executor = h.executor.clone();
        let submitted =
            tokio::spawn(async move { executor.submit(task("t1", &["generation"])).await });

        // Let the submission reach the running stage
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.executor.cancel("t1").await);

        let result = submitted.await.unwrap().unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("cancelled"));

        // Agents are released, not left Busy, and uncounted
        let agent = h.registry.read().await.get("generation").unwrap();
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.tasks_completed, 0);

        // Exactly one history entry
        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_unknown_task_returns_false() {
        let h = fast_harness();
        assert!(!h.executor.cancel("nonexistent").await);
    }

    #[tokio::test]
    async fn test_cancel_completed_task_returns_false_without_duplicate() {
        let h = fast_harness();

        h.executor.submit(task("t1", &["generation"])).await.unwrap();
        assert_eq!(h.history.lock().await.len(), 1);

        assert!(!h.executor.cancel("t1").await);
        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_id_rejected() {
        let h = slow_harness(Duration::from_millis(50));

        let executor = h.executor.clone();
        let first =
            tokio::spawn(async move { executor.submit(task("t1", &["generation"])).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = h.executor.submit(task("t1", &["validation"])).await;
        assert!(matches!(
            second,
            Err(Error::Task(TaskError::DuplicateTask(_)))
        ));

        assert!(first.await.unwrap().unwrap().success);
    }

    #[tokio::test]
    async fn test_timeout_records_failure_and_releases() {
        let h = slow_harness(Duration::from_secs(30));
        let executor = h.executor.with_task_timeout(Duration::from_millis(30));

        let result = executor.submit(task("t1", &["generation"])).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("timed out"));

        let agent = h.registry.read().await.get("generation").unwrap();
        assert_eq!(agent.status, AgentStatus::Error);

        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_runner_error_records_failure() {
        let mut runner = MockTaskRunner::new();
        runner
            .expect_run()
            .returning(|_, _, _| Err(anyhow::anyhow!("model unavailable")));
        let h = harness(Arc::new(runner));

        let result = h.executor.submit(task("t1", &["generation"])).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("model unavailable"));

        let agent = h.registry.read().await.get("generation").unwrap();
        assert_eq!(agent.status, AgentStatus::Error);
        assert_eq!(h.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_attempts_high_priority_first() {
        let h = fast_harness();

        let low = task("low", &["generation"]).with_priority(TaskPriority::Low);
        let high = task("high", &["generation"]).with_priority(TaskPriority::High);

        let results = h.executor.submit_batch(vec![low, high]).await;
        let results: Vec<TaskResult> = results.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(results[0].task_id, "high");
        assert_eq!(results[1].task_id, "low");
        // Sequential batch admission: both run, in priority order
        assert!(results.iter().all(|r| r.success));
    }
}
