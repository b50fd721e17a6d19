// StepsRunnerSettings: knobs the host process hands to the steps runner.
// Loaded from a JSON settings file, then overridden from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::variables;
use crate::tracing::{TraceEventType, TraceSetting};

/// Settings for a steps runner invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepsRunnerSettings {
    /// Write debug lines (including condition traces) into step logs.
    #[serde(default, rename = "StepDebug")]
    pub step_debug: bool,

    /// Diagnostic trace output for the hosting process.
    #[serde(flatten)]
    pub trace: TraceSetting,
}

impl StepsRunnerSettings {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let content = content.trim_start_matches('\u{feff}');
        let settings: Self = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        Ok(settings)
    }

    /// Default settings with environment overrides applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(debug) = lookup(variables::actions::STEP_DEBUG).and_then(|v| parse_bool(&v)) {
            self.step_debug = debug;
        }

        if let Some(level) =
            lookup(variables::agent::TRACE_LEVEL).and_then(|v| TraceEventType::parse(&v))
        {
            self.trace.level = level;
        }

        if let Some(json) = lookup(variables::agent::TRACE_JSON).and_then(|v| parse_bool(&v)) {
            self.trace.json = json;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
