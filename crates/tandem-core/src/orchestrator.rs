//! Orchestrator facade tying together modes, agents, tasks, history, and
//! preferences

use crate::agent::AgentRegistry;
use crate::executor::TaskExecutor;
use crate::history::HistoryLog;
use crate::mode::ModeController;
use crate::preferences::PreferenceStore;
use crate::runner::{SimulatedRunner, TaskRunner};
use crate::types::{
    Agent, AgentEvent, AgentStatus, DevelopmentTask, Mode, ModeConfig, ModeConfigUpdate,
    ModeEvent, TaskResult, UserInteraction, UserPreferences, UserPreferencesUpdate,
};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Duration;
use tracing::warn;

/// Agents used by [`Orchestrator::execute_prompt`] when the caller names
/// none
pub const DEFAULT_PROMPT_AGENTS: [&str; 2] = ["context", "analysis"];

/// Truncated prompt length recorded with interactions
const INTERACTION_CONTEXT_LEN: usize = 80;

/// The in-process orchestration service
///
/// Owns the agent registry, mode controller, task executor, history log,
/// and preference store, and exposes the entry points a presentation layer
/// (panel, API) calls. One instance per process; subscribers attach through
/// the event channels rather than ambient globals.
pub struct Orchestrator {
    registry: Arc<RwLock<AgentRegistry>>,
    mode: Arc<RwLock<ModeController>>,
    history: Arc<Mutex<HistoryLog>>,
    preferences: Arc<Mutex<PreferenceStore>>,
    executor: TaskExecutor,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in catalog and the simulated
    /// runner
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SimulatedRunner::new()))
    }

    /// Create an orchestrator with an injected unit-of-work strategy
    pub fn with_runner(runner: Arc<dyn TaskRunner>) -> Self {
        let registry = Arc::new(RwLock::new(AgentRegistry::new()));
        let mode = Arc::new(RwLock::new(ModeController::new()));
        let history = Arc::new(Mutex::new(HistoryLog::new()));
        let preferences = Arc::new(Mutex::new(PreferenceStore::new()));
        let executor = TaskExecutor::new(
            Arc::clone(&registry),
            Arc::clone(&mode),
            Arc::clone(&history),
            runner,
        );

        Self {
            registry,
            mode,
            history,
            preferences,
            executor,
        }
    }

    /// Override the unit-of-work timeout
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_task_timeout(timeout);
        self
    }

    // --- Mode management ---

    pub async fn mode(&self) -> Mode {
        self.mode.read().await.mode()
    }

    pub async fn set_mode(&self, mode: Mode) {
        self.mode.write().await.set_mode(mode);
    }

    pub async fn config(&self) -> ModeConfig {
        self.mode.read().await.config()
    }

    pub async fn update_config(&self, update: ModeConfigUpdate) -> crate::Result<()> {
        self.mode.write().await.update_config(update)
    }

    /// Subscribe to mode-change and config-change events
    pub async fn subscribe_mode_events(&self) -> broadcast::Receiver<ModeEvent> {
        self.mode.read().await.subscribe()
    }

    // --- Agent management ---

    pub async fn list_agents(&self) -> Vec<Agent> {
        self.registry.read().await.list()
    }

    /// All agents whose status is not Idle
    pub async fn get_active_agents(&self) -> Vec<Agent> {
        self.registry.read().await.active()
    }

    pub async fn get_agent(&self, id: &str) -> Option<Agent> {
        self.registry.read().await.get(id)
    }

    /// Bring an agent into the Active state
    pub async fn start_agent(&self, id: &str) -> bool {
        self.override_status(id, AgentStatus::Active).await
    }

    /// Park an agent in the Idle state
    pub async fn stop_agent(&self, id: &str) -> bool {
        self.override_status(id, AgentStatus::Idle).await
    }

    /// Reset an agent to Idle, clearing an Error state
    pub async fn restart_agent(&self, id: &str) -> bool {
        self.override_status(id, AgentStatus::Idle).await
    }

    /// Subscribe to agent status-change and list-change events
    pub async fn subscribe_agent_events(&self) -> broadcast::Receiver<AgentEvent> {
        self.registry.read().await.subscribe()
    }

    async fn override_status(&self, id: &str, status: AgentStatus) -> bool {
        match self.registry.write().await.set_status(id, status) {
            Ok(()) => true,
            Err(err) => {
                warn!("Agent status override failed: {}", err);
                false
            }
        }
    }

    // --- Task execution ---

    /// Submit a task and wait for its result
    ///
    /// On completion the interaction is forwarded to the preference store
    /// for learning.
    pub async fn execute_task(&self, task: DevelopmentTask) -> crate::Result<TaskResult> {
        let mode = task.mode;
        let context: String = task.prompt.chars().take(INTERACTION_CONTEXT_LEN).collect();

        let result = self.executor.submit(task).await?;

        self.preferences.lock().await.record(UserInteraction::new(
            "task",
            context,
            mode,
            result.success,
            result.duration_ms,
        ));
        Ok(result)
    }

    /// Convenience entry point: run a bare prompt with the standard agent
    /// set under the given mode (or the current one)
    pub async fn execute_prompt(
        &self,
        prompt: impl Into<String>,
        mode: Option<Mode>,
    ) -> crate::Result<TaskResult> {
        let mode = match mode {
            Some(mode) => mode,
            None => self.mode().await,
        };
        let task = DevelopmentTask::new(prompt, mode).with_required_agents(DEFAULT_PROMPT_AGENTS);
        self.execute_task(task).await
    }

    /// Request cancellation of an in-flight task
    pub async fn cancel_task(&self, task_id: &str) -> bool {
        self.executor.cancel(task_id).await
    }

    /// Read-only copy of the retained task results, oldest first
    pub async fn get_task_history(&self) -> Vec<TaskResult> {
        self.history.lock().await.all()
    }

    // --- Quick actions ---

    pub async fn generate_tests(&self, file_path: Option<&str>) -> crate::Result<TaskResult> {
        let mode = self.mode().await;
        self.execute_task(DevelopmentTask::generate_tests(file_path, mode))
            .await
    }

    pub async fn refactor_code(&self, selection: Option<&str>) -> crate::Result<TaskResult> {
        let mode = self.mode().await;
        self.execute_task(DevelopmentTask::refactor_code(selection, mode))
            .await
    }

    pub async fn add_documentation(&self, target: Option<&str>) -> crate::Result<TaskResult> {
        let mode = self.mode().await;
        self.execute_task(DevelopmentTask::add_documentation(target, mode))
            .await
    }

    pub async fn optimize_code(&self, scope: Option<&str>) -> crate::Result<TaskResult> {
        let mode = self.mode().await;
        self.execute_task(DevelopmentTask::optimize_code(scope, mode))
            .await
    }

    // --- Learning and adaptation ---

    pub async fn record_interaction(&self, interaction: UserInteraction) {
        self.preferences.lock().await.record(interaction);
    }

    pub async fn get_user_preferences(&self) -> UserPreferences {
        self.preferences.lock().await.get()
    }

    pub async fn update_user_preferences(&self, update: UserPreferencesUpdate) {
        self.preferences.lock().await.update(update);
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SimulatedRunner;

    fn orchestrator() -> Orchestrator {
        Orchestrator::with_runner(Arc::new(SimulatedRunner::with_step_delay(
            Duration::from_millis(1),
        )))
    }

    #[tokio::test]
    async fn test_execute_prompt_uses_standard_agents() {
        let orch = orchestrator();

        let result = orch.execute_prompt("explain this function", None).await.unwrap();
        assert!(result.success);
        assert_eq!(
            result.agents_used,
            vec!["context".to_string(), "analysis".to_string()]
        );
        assert_eq!(orch.get_task_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_prompt_mode_override() {
        let orch = orchestrator();
        assert_eq!(orch.mode().await, Mode::Vibecoding);

        let result = orch
            .execute_prompt("verify the invariants", Some(Mode::SpecCentric))
            .await
            .unwrap();
        assert!(result.success);
        // The override does not switch the active mode
        assert_eq!(orch.mode().await, Mode::Vibecoding);
    }

    #[tokio::test]
    async fn test_quick_action_generate_tests() {
        let orch = orchestrator();

        let result = orch.generate_tests(Some("src/parser.rs")).await.unwrap();
        assert!(result.success);
        assert_eq!(
            result.agents_used,
            vec!["generation".to_string(), "validation".to_string()]
        );
    }

    #[tokio::test]
    async fn test_admin_agent_controls() {
        let orch = orchestrator();

        assert!(orch.start_agent("generation").await);
        assert_eq!(
            orch.get_agent("generation").await.unwrap().status,
            AgentStatus::Active
        );

        assert!(orch.stop_agent("generation").await);
        assert_eq!(
            orch.get_agent("generation").await.unwrap().status,
            AgentStatus::Idle
        );

        // Restart clears an Error state back to Idle
        orch.registry
            .write()
            .await
            .set_status("generation", AgentStatus::Error)
            .unwrap();
        assert!(orch.restart_agent("generation").await);
        assert_eq!(
            orch.get_agent("generation").await.unwrap().status,
            AgentStatus::Idle
        );

        assert!(!orch.start_agent("nonexistent").await);
        assert!(!orch.stop_agent("nonexistent").await);
        assert!(!orch.restart_agent("nonexistent").await);
    }

    #[tokio::test]
    async fn test_active_agents_excludes_idle() {
        let orch = orchestrator();
        orch.stop_agent("analysis").await;

        let active: Vec<String> = orch
            .get_active_agents()
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(active, vec!["context".to_string()]);
    }

    #[tokio::test]
    async fn test_mode_switch_preserves_state() {
        let orch = orchestrator();
        orch.execute_prompt("warm up", None).await.unwrap();

        let history_before = orch.get_task_history().await.len();
        let agents_before: Vec<_> = orch
            .list_agents()
            .await
            .into_iter()
            .map(|a| (a.id, a.status, a.tasks_completed))
            .collect();

        orch.set_mode(Mode::SpecCentric).await;

        assert_eq!(orch.mode().await, Mode::SpecCentric);
        assert_eq!(orch.get_task_history().await.len(), history_before);
        let agents_after: Vec<_> = orch
            .list_agents()
            .await
            .into_iter()
            .map(|a| (a.id, a.status, a.tasks_completed))
            .collect();
        assert_eq!(agents_after, agents_before);
    }

    #[tokio::test]
    async fn test_agent_events_reach_subscribers() {
        let orch = orchestrator();
        let mut rx = orch.subscribe_agent_events().await;

        orch.execute_prompt("watch the transitions", None).await.unwrap();

        // First transition: a prompt agent goes Busy
        match rx.recv().await.unwrap() {
            AgentEvent::StatusChanged { agent_id, status } => {
                assert_eq!(agent_id, "context");
                assert_eq!(status, AgentStatus::Busy);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mode_events_reach_subscribers() {
        let orch = orchestrator();
        let mut rx = orch.subscribe_mode_events().await;

        orch.set_mode(Mode::SpecCentric).await;

        match rx.recv().await.unwrap() {
            ModeEvent::ModeChanged { mode } => assert_eq!(mode, Mode::SpecCentric),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_preferences_update_roundtrip() {
        let orch = orchestrator();

        orch.update_user_preferences(UserPreferencesUpdate {
            preferred_mode: Some(Mode::SpecCentric),
            ..Default::default()
        })
        .await;

        assert_eq!(
            orch.get_user_preferences().await.preferred_mode,
            Mode::SpecCentric
        );
    }

    #[tokio::test]
    async fn test_cancel_unknown_task_is_benign() {
        let orch = orchestrator();
        assert!(!orch.cancel_task("never-submitted").await);
    }
}
