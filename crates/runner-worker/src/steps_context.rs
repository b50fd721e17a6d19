// StepsContext: the outcome and conclusion of every step the runner considered.
// Kept on the job context for diagnostics by the caller.

use std::collections::HashMap;

use runner_common::util::task_result_util::TaskResult;

/// Recorded result for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Outcome before `continue-on-error` adjustment.
    pub outcome: TaskResult,

    /// Conclusion after `continue-on-error` adjustment.
    pub conclusion: TaskResult,
}

/// Tracks the results of all steps considered during a run.
#[derive(Debug, Clone, Default)]
pub struct StepsContext {
    /// Map of step id → step result.
    results: HashMap<String, StepResult>,
}

impl StepsContext {
    /// Create a new, empty `StepsContext`.
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
        }
    }

    /// The conclusion of a step: a failure under `continue-on-error`
    /// concludes as `SucceededWithIssues`, anything else as-is.
    pub fn conclusion(outcome: TaskResult, continue_on_error: bool) -> TaskResult {
        match outcome {
            TaskResult::Failed if continue_on_error => TaskResult::SucceededWithIssues,
            other => other,
        }
    }

    /// Record the result of a step. A later record for the same id replaces
    /// the earlier one.
    pub fn record_step(&mut self, step_id: &str, outcome: TaskResult, conclusion: TaskResult) {
        self.results.insert(
            step_id.to_string(),
            StepResult {
                outcome,
                conclusion,
            },
        );
    }

    /// Check if a step has been recorded.
    pub fn has_step(&self, step_id: &str) -> bool {
        self.results.contains_key(step_id)
    }

    /// Get the outcome of a step.
    pub fn get_outcome(&self, step_id: &str) -> Option<TaskResult> {
        self.results.get(step_id).map(|r| r.outcome)
    }

    /// Get the conclusion of a step.
    pub fn get_conclusion(&self, step_id: &str) -> Option<TaskResult> {
        self.results.get(step_id).map(|r| r.conclusion)
    }

    /// Get all recorded steps.
    pub fn steps(&self) -> &HashMap<String, StepResult> {
        &self.results
    }

    /// Convert to a serde_json::Value for diagnostics output.
    pub fn to_value(&self) -> serde_json::Value {
        let map = self
            .results
            .iter()
            .map(|(id, result)| {
                (
                    id.clone(),
                    serde_json::json!({
                        "outcome": result.outcome.to_string(),
                        "conclusion": result.conclusion.to_string(),
                    }),
                )
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}
