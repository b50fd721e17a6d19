// ExecutionContext and the IStep trait.
// A context holds the result slot and log of one job or one step. The job-level
// context also carries the record of every step the runner considered.

use async_trait::async_trait;
use runner_common::constants::log_prefixes;
use runner_common::settings::StepsRunnerSettings;
use runner_common::util::task_result_util::TaskResult;

use crate::steps_context::StepsContext;

// ---------------------------------------------------------------------------
// IStep trait
// ---------------------------------------------------------------------------

/// A step that can be executed by the StepsRunner.
///
/// Step kinds differ only in the flags below; each step owns the execution
/// context it reports its outcome through.
#[async_trait]
pub trait IStep: Send + Sync {
    /// Unique identifier for this step.
    fn id(&self) -> &str;

    /// Human-friendly display name.
    fn display_name(&self) -> &str;

    /// Condition expression. Empty means `succeeded()`.
    fn condition(&self) -> &str {
        ""
    }

    /// Whether a failure of this step is softened to `SucceededWithIssues`.
    fn continue_on_error(&self) -> bool {
        false
    }

    /// Whether an unsoftened failure of this step skips all later non-finally steps.
    fn critical(&self) -> bool {
        false
    }

    /// Disabled steps are never executed.
    fn enabled(&self) -> bool {
        true
    }

    /// Finally steps bypass condition gating and the critical short-circuit.
    fn is_finally(&self) -> bool {
        false
    }

    /// The context this step reports its outcome through.
    fn execution_context(&self) -> &ExecutionContext;

    fn execution_context_mut(&mut self) -> &mut ExecutionContext;

    /// Mark this step as not run. The runner calls this once per skipped step.
    fn mark_skipped(&mut self) {
        self.execution_context_mut().skip();
    }

    /// Execute this step.
    ///
    /// A step reports failure by completing its context with a result, not by
    /// returning `Err`. An `Err` is treated as an infrastructure fault.
    async fn run_async(&mut self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// ExecutionContext
// ---------------------------------------------------------------------------

/// The execution context for a job or a step.
pub struct ExecutionContext {
    /// Display name for this context (job name or step name).
    display_name: String,

    /// The result of this context. Unset until completed or skipped.
    result: Option<TaskResult>,

    /// Result message (e.g. error message on failure).
    result_message: Option<String>,

    /// Whether this context has been completed.
    is_completed: bool,

    /// Whether the step was intentionally not run.
    is_skipped: bool,

    /// Whether debug lines are written.
    write_debug: bool,

    /// Outcomes of the steps considered so far (job-level contexts only).
    steps_context: StepsContext,

    /// Accumulated log lines for this context.
    log_lines: Vec<String>,
}

impl ExecutionContext {
    /// Create a new root execution context for a job.
    pub fn new_root(display_name: impl Into<String>, settings: &StepsRunnerSettings) -> Self {
        Self {
            display_name: display_name.into(),
            result: None,
            result_message: None,
            is_completed: false,
            is_skipped: false,
            write_debug: settings.step_debug,
            steps_context: StepsContext::new(),
            log_lines: Vec::new(),
        }
    }

    /// Create a child execution context for a step.
    pub fn create_step_context(&self, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            result: None,
            result_message: None,
            is_completed: false,
            is_skipped: false,
            write_debug: self.write_debug,
            steps_context: StepsContext::new(),
            log_lines: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get the current result.
    pub fn result(&self) -> Option<TaskResult> {
        self.result
    }

    /// Get the current result message.
    pub fn result_message(&self) -> Option<&str> {
        self.result_message.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Whether this step was skipped rather than run.
    pub fn is_skipped(&self) -> bool {
        self.is_skipped
    }

    pub fn write_debug(&self) -> bool {
        self.write_debug
    }

    pub fn steps_context(&self) -> &StepsContext {
        &self.steps_context
    }

    pub fn steps_context_mut(&mut self) -> &mut StepsContext {
        &mut self.steps_context
    }

    /// Set the result.
    pub fn set_result(&mut self, result: TaskResult) {
        self.result = Some(result);
    }

    // -----------------------------------------------------------------------
    // Logging
    // -----------------------------------------------------------------------

    /// Write an informational message.
    pub fn info(&mut self, message: &str) {
        self.log_lines.push(message.to_string());
        tracing::info!(target: "step", "[{}] {}", self.display_name, message);
    }

    /// Write a debug message (only if step debug is enabled).
    pub fn debug(&mut self, message: &str) {
        if self.write_debug {
            self.log_lines
                .push(format!("{}{}", log_prefixes::DEBUG, message));
            tracing::debug!(target: "step", "[{}] {}", self.display_name, message);
        }
    }

    /// Write a warning message.
    pub fn warning(&mut self, message: &str) {
        self.log_lines
            .push(format!("{}{}", log_prefixes::WARNING, message));
        tracing::warn!(target: "step", "[{}] {}", self.display_name, message);
    }

    /// Write an error message.
    pub fn error(&mut self, message: &str) {
        self.log_lines
            .push(format!("{}{}", log_prefixes::ERROR, message));
        tracing::error!(target: "step", "[{}] {}", self.display_name, message);
    }

    /// Get all log lines recorded in this context.
    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Mark this context as complete with the given result.
    pub fn complete(&mut self, result: TaskResult, message: Option<&str>) {
        if self.is_completed {
            tracing::warn!(
                "Attempted to complete already-completed context: {}",
                self.display_name
            );
            return;
        }

        self.result = Some(result);
        self.result_message = message.map(|s| s.to_string());
        self.is_completed = true;

        let msg = format!(
            "Finishing: {} (Result: {}{})",
            self.display_name,
            result,
            message.map(|m| format!(", Message: {}", m)).unwrap_or_default()
        );

        match result {
            TaskResult::Succeeded | TaskResult::SucceededWithIssues | TaskResult::Skipped => {
                tracing::info!(target: "step", "{}", msg)
            }
            _ => tracing::error!(target: "step", "{}", msg),
        }
    }

    /// Mark this step as intentionally not run.
    ///
    /// Sets the result to `Skipped` and completes the context.
    pub fn skip(&mut self) {
        if self.is_completed {
            tracing::warn!(
                "Attempted to skip already-completed context: {}",
                self.display_name
            );
            return;
        }

        self.is_skipped = true;
        self.info(&format!("Skipping step: {}", self.display_name));
        self.complete(TaskResult::Skipped, None);
    }
}
