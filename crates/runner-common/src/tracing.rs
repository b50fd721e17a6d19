// Tracing setup for processes that host the steps runner.
// Installs a `tracing-subscriber` formatter whose level comes from settings,
// with `RUST_LOG` taking precedence when present.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Trace event severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TraceEventType {
    Verbose,
    #[default]
    Information,
    Warning,
    Error,
}

impl TraceEventType {
    /// Parse a level name as found in settings files or the environment.
    ///
    /// Accepts both the runner names (`Verbose`, `Information`) and the
    /// `tracing` names (`debug`, `info`). Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "verbose" | "debug" | "trace" => Some(TraceEventType::Verbose),
            "information" | "info" => Some(TraceEventType::Information),
            "warning" | "warn" => Some(TraceEventType::Warning),
            "error" | "err" => Some(TraceEventType::Error),
            _ => None,
        }
    }

    /// The matching `tracing` filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            TraceEventType::Verbose => "debug",
            TraceEventType::Information => "info",
            TraceEventType::Warning => "warn",
            TraceEventType::Error => "error",
        }
    }
}

impl std::fmt::Display for TraceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEventType::Verbose => write!(f, "VERB"),
            TraceEventType::Information => write!(f, "INFO"),
            TraceEventType::Warning => write!(f, "WARN"),
            TraceEventType::Error => write!(f, "ERR "),
        }
    }
}

/// Configuration for trace output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TraceSetting {
    /// Minimum severity level to emit.
    #[serde(default, rename = "TraceLevel")]
    pub level: TraceEventType,

    /// Emit one JSON object per event instead of human-readable lines.
    #[serde(default, rename = "TraceJson")]
    pub json: bool,
}

impl TraceSetting {
    /// Build the filter for this setting. `RUST_LOG` wins when it is set.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

/// Build a formatting subscriber for `setting` that writes to `make_writer`.
pub fn build_subscriber<W>(
    setting: &TraceSetting,
    make_writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(setting.env_filter())
        .with_writer(make_writer);
    if setting.json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    }
}

/// Install the global tracing subscriber, writing to stdout.
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(setting: &TraceSetting) -> Result<()> {
    build_subscriber(setting, std::io::stdout)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
