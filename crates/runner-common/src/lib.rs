// runner-common: Shared types and infrastructure for the job worker.
// Outcome aggregation, settings and tracing setup used by `runner-worker`.

pub mod constants;
pub mod settings;
pub mod tracing;
pub mod util;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use settings::StepsRunnerSettings;
pub use crate::tracing::{build_subscriber, init_tracing, TraceEventType, TraceSetting};
pub use util::task_result_util::{TaskResult, TaskResultUtil};
