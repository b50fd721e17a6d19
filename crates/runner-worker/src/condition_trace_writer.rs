// ConditionTraceWriter: records how a step's condition was decided.
// Only collects anything when step debug is enabled; the runner copies the
// traces into the step's log as debug lines.

use runner_common::constants::conditions;

use crate::expressions::ConditionSignal;

/// Traces condition evaluation for debugging purposes.
pub struct ConditionTraceWriter {
    /// Whether tracing is enabled.
    enabled: bool,

    /// Accumulated trace messages.
    traces: Vec<String>,
}

impl ConditionTraceWriter {
    /// Create a new trace writer.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            traces: Vec::new(),
        }
    }

    /// Check if tracing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Trace the start of condition evaluation.
    pub fn trace_condition_start(&mut self, step_name: &str, condition: &str) {
        if !self.enabled {
            return;
        }
        let condition = if condition.trim().is_empty() {
            conditions::DEFAULT
        } else {
            condition
        };
        self.traces.push(format!(
            "Evaluating condition for step '{}': {}",
            step_name, condition
        ));
    }

    /// Trace a condition answered by the runner's built-in status functions.
    pub fn trace_builtin(&mut self, signal: &ConditionSignal, result: bool) {
        if !self.enabled {
            return;
        }
        self.traces.push(format!(
            "  built-in => {} (job_status={})",
            result, signal
        ));
    }

    /// Trace a condition answered by the external evaluator.
    pub fn trace_delegated(&mut self, signal: &ConditionSignal, result: bool) {
        if !self.enabled {
            return;
        }
        self.traces.push(format!(
            "  evaluator => {} (job_status={})",
            result, signal
        ));
    }

    /// Trace an evaluator failure.
    pub fn trace_evaluation_error(&mut self, error: &anyhow::Error) {
        if !self.enabled {
            return;
        }
        self.traces.push(format!("  evaluator => error: {:#}", error));
    }

    /// Trace the final result of condition evaluation.
    pub fn trace_condition_result(&mut self, step_name: &str, result: bool) {
        if !self.enabled {
            return;
        }
        let action = if result { "will execute" } else { "will be skipped" };
        self.traces.push(format!(
            "Step '{}' {} (condition evaluated to {})",
            step_name, action, result
        ));
    }

    /// Get all accumulated trace messages.
    pub fn get_traces(&self) -> &[String] {
        &self.traces
    }

    /// Consume the writer and return the traces.
    pub fn into_traces(self) -> Vec<String> {
        self.traces
    }
}

impl Default for ConditionTraceWriter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_common::util::task_result_util::TaskResult;

    #[test]
    fn test_disabled_tracing() {
        let mut writer = ConditionTraceWriter::default();
        assert!(!writer.is_enabled());
        writer.trace_condition_start("step1", "succeededOrFailed()");
        writer.trace_builtin(&ConditionSignal::from_job_outcome(TaskResult::Failed), true);
        writer.trace_condition_result("step1", true);
        assert!(writer.get_traces().is_empty());
    }

    #[test]
    fn test_enabled_tracing() {
        let mut writer = ConditionTraceWriter::new(true);
        writer.trace_condition_start("step1", "succeededOrFailed()");
        assert_eq!(writer.get_traces().len(), 1);
        assert!(writer.get_traces()[0].contains("step1"));
        assert!(writer.get_traces()[0].contains("succeededOrFailed()"));
    }

    #[test]
    fn test_empty_condition_traced_as_default() {
        let mut writer = ConditionTraceWriter::new(true);
        writer.trace_condition_start("build", "");
        assert_eq!(
            writer.get_traces()[0],
            "Evaluating condition for step 'build': succeeded()"
        );
    }

    #[test]
    fn test_builtin_and_delegated_traces() {
        let mut writer = ConditionTraceWriter::new(true);
        let signal = ConditionSignal::from_job_outcome(TaskResult::SucceededWithIssues);
        writer.trace_builtin(&signal, true);
        writer.trace_delegated(&signal, false);
        let traces = writer.into_traces();
        assert_eq!(traces[0], "  built-in => true (job_status=SucceededWithIssues)");
        assert_eq!(traces[1], "  evaluator => false (job_status=SucceededWithIssues)");
    }

    #[test]
    fn test_evaluation_error_trace() {
        let mut writer = ConditionTraceWriter::new(true);
        writer.trace_evaluation_error(&anyhow::anyhow!("boom"));
        assert_eq!(writer.get_traces(), ["  evaluator => error: boom"]);
    }

    #[test]
    fn test_condition_result() {
        let mut writer = ConditionTraceWriter::new(true);
        writer.trace_condition_result("deploy", false);
        assert!(writer.get_traces()[0].contains("will be skipped"));
    }
}
