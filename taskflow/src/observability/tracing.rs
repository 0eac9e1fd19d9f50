//! Span attributes and timing for task execution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for one task execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpanAttributes {
    /// Task path.
    pub task_path: String,
    /// Task type name.
    pub task_type: Option<String>,
    /// Number of actions that ran.
    pub actions: Option<usize>,
    /// Whether the execution was incremental.
    pub incremental: Option<bool>,
    /// Execution status.
    pub status: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl TaskSpanAttributes {
    /// Creates new task span attributes.
    #[must_use]
    pub fn new(task_path: impl Into<String>) -> Self {
        Self {
            task_path: task_path.into(),
            ..Default::default()
        }
    }

    /// Sets the task type.
    #[must_use]
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    /// Sets the number of actions that ran.
    #[must_use]
    pub fn with_actions(mut self, actions: usize) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Sets whether the execution was incremental.
    #[must_use]
    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = Some(incremental);
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Converts to flat, OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("task.path".to_string(), self.task_path.clone());

        if let Some(ref v) = self.task_type {
            attrs.insert("task.type".to_string(), v.clone());
        }
        if let Some(v) = self.actions {
            attrs.insert("task.actions".to_string(), v.to_string());
        }
        if let Some(v) = self.incremental {
            attrs.insert("task.incremental".to_string(), v.to_string());
        }
        if let Some(ref v) = self.status {
            attrs.insert("task.status".to_string(), v.clone());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("task.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("task.error".to_string(), v.clone());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_span_attributes() {
        let attrs = TaskSpanAttributes::new(":app:compile")
            .with_task_type("JavaCompile")
            .with_actions(2)
            .with_status("completed")
            .with_duration_ms(12.5);

        let otel = attrs.to_otel_attributes();
        assert_eq!(otel.get("task.path"), Some(&":app:compile".to_string()));
        assert_eq!(otel.get("task.type"), Some(&"JavaCompile".to_string()));
        assert_eq!(otel.get("task.actions"), Some(&"2".to_string()));
        assert_eq!(otel.get("task.duration_ms"), Some(&"12.5".to_string()));
        assert!(!otel.contains_key("task.error"));
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("test_span");
        assert_eq!(timer.name(), "test_span");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let duration = timer.finish();
        assert!(duration >= 10.0);
    }
}
