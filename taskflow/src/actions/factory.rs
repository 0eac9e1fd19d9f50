//! Action factories and the actions they produce.

use super::{ActionMethod, IncrementalInputs};
use crate::core::TaskNode;
use crate::errors::ActionExecutionError;
use crate::isolation::{Instantiator, ProjectLockGuard};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution contract of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A parameterless action.
    Standard,
    /// An action receiving incremental inputs.
    Incremental,
    /// An action run off the project lock with isolated parameters.
    Isolated,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Incremental => write!(f, "incremental"),
            Self::Isolated => write!(f, "isolated"),
        }
    }
}

/// What an action sees of its caller while it runs.
///
/// The context borrows the guard of the project lock held by the executer.
pub struct ActionContext<'a, 'g> {
    guard: &'a mut ProjectLockGuard<'g>,
    inputs: Option<&'a IncrementalInputs>,
    instantiator: &'a Instantiator,
}

impl<'a, 'g> ActionContext<'a, 'g> {
    /// Creates a new action context.
    pub fn new(
        guard: &'a mut ProjectLockGuard<'g>,
        inputs: Option<&'a IncrementalInputs>,
        instantiator: &'a Instantiator,
    ) -> Self {
        Self {
            guard,
            inputs,
            instantiator,
        }
    }

    /// Returns the incremental inputs of this execution, if any.
    #[must_use]
    pub fn inputs(&self) -> Option<&IncrementalInputs> {
        self.inputs
    }

    /// Returns the instantiator for isolated action logic.
    #[must_use]
    pub fn instantiator(&self) -> &Instantiator {
        self.instantiator
    }

    /// Runs `f` with the project lock released, reacquiring it afterwards.
    pub fn without_project_lock<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.guard.unlocked(f)
    }
}

impl fmt::Debug for ActionContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// A single-invocation action produced by a [`TaskActionFactory`].
pub trait TaskAction: Send {
    /// Returns a human-readable name for logs and errors.
    fn display_name(&self) -> String;

    /// Runs the action against `task`.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionExecutionError`] if the action fails.
    fn execute(
        &self,
        task: &TaskNode,
        context: &mut ActionContext<'_, '_>,
    ) -> Result<(), ActionExecutionError>;
}

/// A reusable blueprint producing a fresh [`TaskAction`] per execution.
pub trait TaskActionFactory: Send + Sync + fmt::Debug {
    /// Returns the execution contract of the produced actions.
    fn kind(&self) -> ActionKind;

    /// Creates a new action.
    fn create(&self) -> Box<dyn TaskAction>;

    /// Returns true if the produced actions receive incremental inputs.
    fn is_incremental(&self) -> bool {
        self.kind() == ActionKind::Incremental
    }
}

fn method_display_name(type_name: &str, method: &ActionMethod) -> String {
    format!("{type_name}.{}()", method.name())
}

/// Produces actions invoking a parameterless action method.
#[derive(Debug, Clone)]
pub struct StandardTaskActionFactory {
    type_name: String,
    method: ActionMethod,
}

impl StandardTaskActionFactory {
    /// Binds a factory to a method declared on `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<String>, method: ActionMethod) -> Self {
        Self {
            type_name: type_name.into(),
            method,
        }
    }

    /// Returns the bound method.
    #[must_use]
    pub fn method(&self) -> &ActionMethod {
        &self.method
    }
}

impl TaskActionFactory for StandardTaskActionFactory {
    fn kind(&self) -> ActionKind {
        ActionKind::Standard
    }

    fn create(&self) -> Box<dyn TaskAction> {
        Box::new(StandardTaskAction {
            name: method_display_name(&self.type_name, &self.method),
            method: self.method.clone(),
        })
    }
}

struct StandardTaskAction {
    name: String,
    method: ActionMethod,
}

impl TaskAction for StandardTaskAction {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn execute(
        &self,
        task: &TaskNode,
        _context: &mut ActionContext<'_, '_>,
    ) -> Result<(), ActionExecutionError> {
        self.method
            .invoke(task, None)
            .map_err(|source| ActionExecutionError::action_failed(task.path(), &self.name, source))
    }
}

/// Produces actions invoking an action method with incremental inputs.
#[derive(Debug, Clone)]
pub struct IncrementalTaskActionFactory {
    type_name: String,
    method: ActionMethod,
}

impl IncrementalTaskActionFactory {
    /// Binds a factory to an incremental method declared on `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<String>, method: ActionMethod) -> Self {
        Self {
            type_name: type_name.into(),
            method,
        }
    }

    /// Returns the bound method.
    #[must_use]
    pub fn method(&self) -> &ActionMethod {
        &self.method
    }
}

impl TaskActionFactory for IncrementalTaskActionFactory {
    fn kind(&self) -> ActionKind {
        ActionKind::Incremental
    }

    fn create(&self) -> Box<dyn TaskAction> {
        Box::new(IncrementalTaskAction {
            name: method_display_name(&self.type_name, &self.method),
            method: self.method.clone(),
        })
    }
}

struct IncrementalTaskAction {
    name: String,
    method: ActionMethod,
}

impl TaskAction for IncrementalTaskAction {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn execute(
        &self,
        task: &TaskNode,
        context: &mut ActionContext<'_, '_>,
    ) -> Result<(), ActionExecutionError> {
        let inputs = context
            .inputs()
            .ok_or_else(|| ActionExecutionError::MissingIncrementalInputs {
                task: task.path().to_string(),
            })?;
        self.method
            .invoke(task, Some(inputs))
            .map_err(|source| ActionExecutionError::action_failed(task.path(), &self.name, source))
    }
}
