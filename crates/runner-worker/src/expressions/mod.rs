// Step condition evaluation.
// The runner answers `succeeded()` and `succeededOrFailed()` itself and hands
// every other condition to a `ConditionEvaluator` together with a status signal
// derived from the job result so far.

use anyhow::Result;
use async_trait::async_trait;
use runner_common::constants::conditions;
use runner_common::util::task_result_util::TaskResult;

/// Errors raised by the built-in status function evaluator.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error("Unrecognized condition expression '{0}'")]
    UnsupportedExpression(String),
}

/// Job status as seen by a step condition.
///
/// Built from the cumulative job result at the moment the condition is
/// evaluated, never from a single step's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionSignal {
    job_status: TaskResult,
}

impl ConditionSignal {
    pub fn from_job_outcome(job_status: TaskResult) -> Self {
        Self { job_status }
    }

    pub fn job_status(&self) -> TaskResult {
        self.job_status
    }

    pub fn is_failed(&self) -> bool {
        self.job_status == TaskResult::Failed
    }

    pub fn is_canceled(&self) -> bool {
        self.job_status == TaskResult::Canceled
    }
}

impl std::fmt::Display for ConditionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.job_status)
    }
}

/// Evaluates step condition expressions the runner does not answer itself.
///
/// Implementations must not mutate run state. An `Err` aborts the run.
#[async_trait]
pub trait ConditionEvaluator: Send + Sync {
    async fn evaluate(&self, expression: &str, signal: &ConditionSignal) -> Result<bool>;
}

/// Answer the built-in conditions without delegating.
///
/// - empty and `succeeded()`: true unless the job status is `Failed`
/// - `succeededOrFailed()`: true unless the job was canceled
///
/// Returns `None` for any other expression.
pub fn evaluate_builtin(condition: &str, signal: &ConditionSignal) -> Option<bool> {
    let trimmed = condition.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(conditions::SUCCEEDED) {
        return Some(!signal.is_failed());
    }

    if trimmed.eq_ignore_ascii_case(conditions::SUCCEEDED_OR_FAILED) {
        return Some(!signal.is_canceled());
    }

    None
}

/// Evaluator for the bare status functions of the condition language:
/// `always()`, `succeeded()`, `failed()`, `canceled()` and `succeededOrFailed()`.
///
/// Anything else is rejected with `ExpressionError::UnsupportedExpression`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFunctionEvaluator;

#[async_trait]
impl ConditionEvaluator for StatusFunctionEvaluator {
    async fn evaluate(&self, expression: &str, signal: &ConditionSignal) -> Result<bool> {
        if let Some(result) = evaluate_builtin(expression, signal) {
            return Ok(result);
        }

        let trimmed = expression.trim();
        if trimmed.eq_ignore_ascii_case(conditions::ALWAYS) {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case(conditions::FAILED) {
            Ok(signal.is_failed())
        } else if trimmed.eq_ignore_ascii_case(conditions::CANCELED) {
            Ok(signal.is_canceled())
        } else {
            Err(ExpressionError::UnsupportedExpression(expression.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(status: TaskResult) -> ConditionSignal {
        ConditionSignal::from_job_outcome(status)
    }

    #[test]
    fn test_empty_defaults_to_succeeded() {
        assert_eq!(evaluate_builtin("", &signal(TaskResult::Succeeded)), Some(true));
        assert_eq!(
            evaluate_builtin("  ", &signal(TaskResult::SucceededWithIssues)),
            Some(true)
        );
        assert_eq!(evaluate_builtin("", &signal(TaskResult::Failed)), Some(false));
    }

    #[test]
    fn test_succeeded_condition() {
        assert_eq!(
            evaluate_builtin("succeeded()", &signal(TaskResult::Succeeded)),
            Some(true)
        );
        assert_eq!(
            evaluate_builtin("Succeeded()", &signal(TaskResult::Failed)),
            Some(false)
        );
    }

    #[test]
    fn test_succeeded_or_failed_condition() {
        for status in [
            TaskResult::Succeeded,
            TaskResult::SucceededWithIssues,
            TaskResult::Failed,
        ] {
            assert_eq!(
                evaluate_builtin("succeededOrFailed()", &signal(status)),
                Some(true),
                "{status}"
            );
        }
        assert_eq!(
            evaluate_builtin(" SUCCEEDEDORFAILED() ", &signal(TaskResult::Canceled)),
            Some(false)
        );
    }

    #[test]
    fn test_other_expressions_not_builtin() {
        let s = signal(TaskResult::Succeeded);
        assert_eq!(evaluate_builtin("always()", &s), None);
        assert_eq!(evaluate_builtin("eq(variables['Build.Reason'], 'PullRequest')", &s), None);
    }

    #[tokio::test]
    async fn test_status_function_evaluator() {
        let evaluator = StatusFunctionEvaluator;
        let ok = signal(TaskResult::Succeeded);
        let failed = signal(TaskResult::Failed);
        let canceled = signal(TaskResult::Canceled);

        assert!(evaluator.evaluate("always()", &failed).await.unwrap());
        assert!(evaluator.evaluate("always()", &canceled).await.unwrap());
        assert!(evaluator.evaluate("failed()", &failed).await.unwrap());
        assert!(!evaluator.evaluate("failed()", &ok).await.unwrap());
        assert!(evaluator.evaluate("canceled()", &canceled).await.unwrap());
        assert!(!evaluator.evaluate("Canceled()", &ok).await.unwrap());
        assert!(evaluator.evaluate("succeeded()", &ok).await.unwrap());
        assert!(evaluator.evaluate("succeededOrFailed()", &failed).await.unwrap());
    }

    #[tokio::test]
    async fn test_status_function_evaluator_rejects_unknown() {
        let err = StatusFunctionEvaluator
            .evaluate("and(succeeded(), eq(1, 1))", &signal(TaskResult::Succeeded))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExpressionError>(),
            Some(ExpressionError::UnsupportedExpression(expr)) if expr == "and(succeeded(), eq(1, 1))"
        ));
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(signal(TaskResult::SucceededWithIssues).to_string(), "SucceededWithIssues");
    }
}
