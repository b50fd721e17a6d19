// runner-worker: Step execution engine for the job worker.
// Depends on `runner-common` for outcomes, settings and tracing setup.
//
// Architecture:
//   StepsRunner::run_async → per step: critical/enabled checks
//     → condition gating (built-ins, then ConditionEvaluator) → IStep::run_async
//     → fold outcome into the job result

pub mod condition_trace_writer;
pub mod execution_context;
pub mod expressions;
pub mod steps_context;
pub mod steps_runner;

pub use execution_context::{ExecutionContext, IStep};
pub use expressions::{ConditionEvaluator, ConditionSignal, StatusFunctionEvaluator};
pub use steps_runner::{StepsRunner, StepsRunnerError};
