// TaskResult and the result-precedence rules used to fold step outcomes into a job result.
// Also translates job results to and from worker process return codes.

use serde::{Deserialize, Serialize};

/// Offset added to TaskResult values to produce process return codes.
const RETURN_CODE_OFFSET: i32 = 100;

/// Terminal status of a step or a job.
///
/// Only `Succeeded < SucceededWithIssues < Failed` take part in escalation.
/// `Canceled`, `Skipped` and `Abandoned` are terminal but never raise a job
/// result above `Succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TaskResult {
    Succeeded = 0,
    SucceededWithIssues = 1,
    Failed = 2,
    Canceled = 3,
    Skipped = 4,
    Abandoned = 5,
}

impl TaskResult {
    /// Create a `TaskResult` from its integer representation.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(TaskResult::Succeeded),
            1 => Some(TaskResult::SucceededWithIssues),
            2 => Some(TaskResult::Failed),
            3 => Some(TaskResult::Canceled),
            4 => Some(TaskResult::Skipped),
            5 => Some(TaskResult::Abandoned),
            _ => None,
        }
    }

    /// Whether this result can raise a job result above `Succeeded`.
    pub fn escalates(self) -> bool {
        matches!(self, TaskResult::SucceededWithIssues | TaskResult::Failed)
    }

    /// Position in the escalation order. Non-escalating results rank with `Succeeded`.
    fn severity(self) -> u8 {
        match self {
            TaskResult::Failed => 2,
            TaskResult::SucceededWithIssues => 1,
            TaskResult::Succeeded
            | TaskResult::Canceled
            | TaskResult::Skipped
            | TaskResult::Abandoned => 0,
        }
    }
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskResult::Succeeded => write!(f, "Succeeded"),
            TaskResult::SucceededWithIssues => write!(f, "SucceededWithIssues"),
            TaskResult::Failed => write!(f, "Failed"),
            TaskResult::Canceled => write!(f, "Canceled"),
            TaskResult::Skipped => write!(f, "Skipped"),
            TaskResult::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Task result utilities.
pub struct TaskResultUtil;

impl TaskResultUtil {
    /// Check whether a return code can be translated to a valid `TaskResult`.
    pub fn is_valid_return_code(return_code: i32) -> bool {
        return_code
            .checked_sub(RETURN_CODE_OFFSET)
            .and_then(TaskResult::from_i32)
            .is_some()
    }

    /// Translate a `TaskResult` to a process return code.
    pub fn translate_to_return_code(result: TaskResult) -> i32 {
        RETURN_CODE_OFFSET + (result as i32)
    }

    /// Translate a process return code to a `TaskResult`.
    ///
    /// Returns `TaskResult::Failed` for unrecognized codes.
    pub fn translate_from_return_code(return_code: i32) -> TaskResult {
        return_code
            .checked_sub(RETURN_CODE_OFFSET)
            .and_then(TaskResult::from_i32)
            .unwrap_or(TaskResult::Failed)
    }

    /// What a step's raw outcome contributes to the job result.
    ///
    /// | outcome               | continue_on_error | contribution          |
    /// |-----------------------|-------------------|-----------------------|
    /// | `Failed`              | true              | `SucceededWithIssues` |
    /// | `Failed`              | false             | `Failed`              |
    /// | `SucceededWithIssues` | any               | `SucceededWithIssues` |
    /// | anything else         | any               | `Succeeded`           |
    pub fn effective_contribution(outcome: TaskResult, continue_on_error: bool) -> TaskResult {
        match outcome {
            TaskResult::Failed if continue_on_error => TaskResult::SucceededWithIssues,
            TaskResult::Failed => TaskResult::Failed,
            TaskResult::SucceededWithIssues => TaskResult::SucceededWithIssues,
            TaskResult::Succeeded
            | TaskResult::Canceled
            | TaskResult::Skipped
            | TaskResult::Abandoned => TaskResult::Succeeded,
        }
    }

    /// Merge two task results, keeping the worse one in the escalation order
    /// `Succeeded < SucceededWithIssues < Failed`.
    ///
    /// Non-escalating results count as `Succeeded`, so the merge is associative
    /// and commutative with `Succeeded` as identity, and always yields one of
    /// the three escalating values.
    pub fn merge_task_results(current_result: TaskResult, coming_result: TaskResult) -> TaskResult {
        let current = Self::effective_contribution(current_result, false);
        let coming = Self::effective_contribution(coming_result, false);
        if coming.severity() > current.severity() {
            coming
        } else {
            current
        }
    }
}
