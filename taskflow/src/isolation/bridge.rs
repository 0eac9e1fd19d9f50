//! Runs isolated action logic without holding the project lock.

use super::InvocationError;
use crate::actions::{ActionContext, ActionKind, TaskAction, TaskActionFactory};
use crate::core::TaskNode;
use crate::errors::ActionExecutionError;
use tracing::debug;

/// Factory for the trailing action of isolatable task types.
#[derive(Debug, Clone)]
pub struct IsolatedTaskActionFactory {
    type_name: String,
}

impl IsolatedTaskActionFactory {
    /// Creates the factory for tasks of `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl TaskActionFactory for IsolatedTaskActionFactory {
    fn kind(&self) -> ActionKind {
        ActionKind::Isolated
    }

    fn create(&self) -> Box<dyn TaskAction> {
        Box::new(IsolatedTaskAction {
            name: format!("{} (isolated)", self.type_name),
        })
    }
}

struct IsolatedTaskAction {
    name: String,
}

impl TaskAction for IsolatedTaskAction {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    /// Snapshots the task's parameters and materializes them while the lock
    /// is still held, then instantiates and runs the action logic with the
    /// lock released.
    fn execute(
        &self,
        task: &TaskNode,
        context: &mut ActionContext<'_, '_>,
    ) -> Result<(), ActionExecutionError> {
        let parameters = task
            .isolated_parameters()
            .ok_or_else(|| ActionExecutionError::NotIsolatable {
                task: task.path().to_string(),
            })?;
        let action_type = *parameters.action_type();

        let snapshot = parameters.isolate();
        let prepared = action_type
            .prepare(&snapshot)
            .map_err(|err| ActionExecutionError::isolation(task.path(), err))?;

        debug!(
            task = task.path(),
            action_type = action_type.name(),
            "Running isolated action without project lock"
        );
        let instantiator = context.instantiator().clone();
        context
            .without_project_lock(|| prepared.invoke(&instantiator))
            .map_err(|err| match err {
                InvocationError::Instantiation(source) => ActionExecutionError::Instantiation {
                    task: task.path().to_string(),
                    action_type: action_type.name().to_string(),
                    source,
                },
                InvocationError::Body(source) => {
                    ActionExecutionError::action_failed(task.path(), &self.name, source)
                }
            })
    }
}
