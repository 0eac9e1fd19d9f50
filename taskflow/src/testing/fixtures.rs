//! Test fixtures for tasks and task types.

use crate::actions::{ActionMethod, TaskType};
use crate::core::{TaskNode, TaskRef};
use parking_lot::Mutex;
use std::sync::Arc;

/// Returns a task type without actions.
#[must_use]
pub fn plain_type() -> Arc<TaskType> {
    TaskType::builder("Plain").build()
}

/// Creates a task of a fresh action-less type.
#[must_use]
pub fn task(path: &str) -> TaskRef {
    task_of(path, &plain_type())
}

/// Creates a task of the given type.
#[must_use]
pub fn task_of(path: &str, task_type: &Arc<TaskType>) -> TaskRef {
    TaskNode::new(path, Arc::clone(task_type)).into_ref()
}

/// Records action invocations as `"<task path>:<action name>"` entries.
#[derive(Debug, Clone, Default)]
pub struct ActionRecorder {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ActionRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a parameterless action method that records its invocations.
    #[must_use]
    pub fn action(&self, name: &str) -> ActionMethod {
        let entries = Arc::clone(&self.entries);
        let label = name.to_string();
        ActionMethod::new(name, move |task| {
            entries.lock().push(format!("{}:{label}", task.path()));
            Ok(())
        })
    }

    /// Returns an incremental action method that records its invocations
    /// along with the number of changed inputs, or `rebuild` for a full
    /// rebuild.
    #[must_use]
    pub fn incremental_action(&self, name: &str) -> ActionMethod {
        let entries = Arc::clone(&self.entries);
        let label = name.to_string();
        ActionMethod::incremental(name, move |task, inputs| {
            let detail = if inputs.is_incremental() {
                inputs.changed().len().to_string()
            } else {
                "rebuild".to_string()
            };
            entries.lock().push(format!("{}:{label}({detail})", task.path()));
            Ok(())
        })
    }

    /// Returns an action method that fails with `message` after recording.
    #[must_use]
    pub fn failing_action(&self, name: &str, message: &str) -> ActionMethod {
        let entries = Arc::clone(&self.entries);
        let label = name.to_string();
        let message = message.to_string();
        ActionMethod::new(name, move |task| {
            entries.lock().push(format!("{}:{label}", task.path()));
            Err(anyhow::anyhow!("{message}"))
        })
    }

    /// Returns the recorded entries in invocation order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns the number of recorded invocations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }
}
