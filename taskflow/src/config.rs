//! Configuration for the taskflow dispatch core.

use crate::errors::TaskflowError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "TASKFLOW_LOG";

/// Environment variable overriding the log output format.
pub const LOG_FORMAT_ENV: &str = "TASKFLOW_LOG_FORMAT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskflowConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Action execution configuration.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Dependency resolution configuration.
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

impl TaskflowConfig {
    /// Parses a configuration from JSON. Missing sections use their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TaskflowError::Config`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, TaskflowError> {
        serde_json::from_str(json).map_err(|e| TaskflowError::Config(e.to_string()))
    }

    /// Applies `TASKFLOW_LOG` and `TASKFLOW_LOG_FORMAT` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskflowError::Config`] if the format variable is not a
    /// known format.
    pub fn with_env_overrides(self) -> Result<Self, TaskflowError> {
        self.with_overrides(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var(LOG_FORMAT_ENV).ok(),
        )
    }

    fn with_overrides(
        mut self,
        filter: Option<String>,
        format: Option<String>,
    ) -> Result<Self, TaskflowError> {
        if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
            self.logging.filter = filter;
        }
        if let Some(format) = format {
            self.logging.format = format.parse()?;
        }
        Ok(self)
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = TaskflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TaskflowError::Config(format!(
                "Unknown log format '{other}', expected 'pretty' or 'json'"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `taskflow=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Whether to include the event target.
    #[serde(default = "default_true")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

/// Action execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Run incremental actions as a full rebuild when no inputs are supplied.
    /// When false, such executions fail instead.
    #[serde(default = "default_true")]
    pub rebuild_when_inputs_missing: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            rebuild_when_inputs_missing: true,
        }
    }
}

/// How a task that depends on itself is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfDependencyPolicy {
    /// Drop the task from its own dependencies.
    #[default]
    Filter,
    /// Drop it and record a resolution failure.
    Report,
}

/// Dependency resolution configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Treatment of self-dependencies.
    #[serde(default)]
    pub self_dependency: SelfDependencyPolicy,
}
