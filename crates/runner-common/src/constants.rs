// Well-known names shared by the steps runner and its host process.

/// Environment variables read when building runner settings.
pub mod variables {
    pub mod actions {
        pub const STEP_DEBUG: &str = "ACTIONS_STEP_DEBUG";
    }

    pub mod agent {
        pub const TRACE_LEVEL: &str = "ACTIONS_RUNNER_TRACE_LEVEL";
        pub const TRACE_JSON: &str = "ACTIONS_RUNNER_TRACE_JSON";
    }
}

/// Built-in status functions recognised in step conditions.
pub mod conditions {
    /// The condition a step gets when it declares none.
    pub const DEFAULT: &str = "succeeded()";

    pub const ALWAYS: &str = "always()";
    pub const SUCCEEDED: &str = "succeeded()";
    pub const FAILED: &str = "failed()";
    pub const CANCELED: &str = "canceled()";
    pub const SUCCEEDED_OR_FAILED: &str = "succeededOrFailed()";
}

/// Log line prefixes understood by the log viewer.
pub mod log_prefixes {
    pub const DEBUG: &str = "##[debug]";
    pub const WARNING: &str = "##[warning]";
    pub const ERROR: &str = "##[error]";
}
