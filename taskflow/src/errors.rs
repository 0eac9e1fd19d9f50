//! Error types for the taskflow dispatch core.
//!
//! Errors fall into three families:
//! - dependency-shape errors raised by `add` on an unrecognized declaration,
//! - action-metadata errors raised once per task type while building its
//!   class info,
//! - action-execution errors raised while running a task's actions.
//!
//! Traversal failures collected during dependency resolution are not errors
//! in this sense; they are recorded as data (see
//! [`ResolutionFailure`](crate::dependencies::ResolutionFailure)).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for taskflow operations.
#[derive(Debug, Error)]
pub enum TaskflowError {
    /// A dependency declaration had an unrecognized shape.
    #[error("{0}")]
    UnsupportedDependency(#[from] UnsupportedDependencyError),

    /// A task type carries structurally invalid action declarations.
    #[error("{0}")]
    ActionMetadata(#[from] ActionMetadataError),

    /// A task action failed while executing.
    #[error("{0}")]
    ActionExecution(#[from] ActionExecutionError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Metadata about an error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "ACTION-005-MULTIPLE_INCREMENTAL").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when `add` is given a value that is not a dependency.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot convert {description} (of type {type_name}) to a task dependency{}", owner_suffix(.owner.as_deref()))]
pub struct UnsupportedDependencyError {
    /// Type name of the offending value.
    pub type_name: String,
    /// Debug rendering of the offending value.
    pub description: String,
    /// Path of the task whose dependencies were being visited, if any.
    pub owner: Option<String>,
}

fn owner_suffix(owner: Option<&str>) -> String {
    owner.map_or_else(String::new, |path| format!(" of task '{path}'"))
}

impl UnsupportedDependencyError {
    /// Creates a new unsupported dependency error.
    #[must_use]
    pub fn new(type_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: description.into(),
            owner: None,
        }
    }

    /// Attributes the error to the task whose dependencies were being visited.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    /// Returns diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let info = ErrorInfo::new("DEPENDENCY-001-UNSUPPORTED", self.to_string())
            .with_fix_hint(
                "Declare dependencies as tasks, task collections, buildables, \
                 dependency containers, transformations, or work actions.",
            )
            .with_context_entry("type_name", &self.type_name);
        match &self.owner {
            Some(owner) => info.with_context_entry("task", owner),
            None => info,
        }
    }
}

/// Errors raised while building the action metadata of a task type.
///
/// These indicate a structurally invalid task type and are memoized by the
/// class-info store, so every lookup of the offending type reports the same
/// error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionMetadataError {
    /// An action was declared on a static method.
    #[error("Cannot declare static method {type_name}.{method}() as a task action.")]
    StaticActionMethod {
        /// The declaring task type.
        type_name: String,
        /// The method name.
        method: String,
    },

    /// An action method declares more than one parameter.
    #[error("Cannot declare method {type_name}.{method}() as a task action as this method takes multiple parameters.")]
    TooManyActionParameters {
        /// The declaring task type.
        type_name: String,
        /// The method name.
        method: String,
    },

    /// An action method's single parameter is not the incremental-inputs type.
    #[error("Cannot declare method {type_name}.{method}() as a task action because {parameter} is not a valid parameter to an action method.")]
    InvalidActionParameter {
        /// The declaring task type.
        type_name: String,
        /// The method name.
        method: String,
        /// The offending parameter type.
        parameter: String,
    },

    /// The same action name was declared twice in one task type.
    #[error("Cannot declare multiple overloads of method {type_name}.{method}() as task actions.")]
    DuplicateActionOverload {
        /// The declaring task type.
        type_name: String,
        /// The method name.
        method: String,
    },

    /// More than one action in the hierarchy accepts incremental inputs.
    #[error("Cannot have multiple task actions accepting an IncrementalInputs parameter (task type {type_name}).")]
    MultipleIncrementalActions {
        /// The concrete task type.
        type_name: String,
    },
}

impl ActionMetadataError {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StaticActionMethod { .. } => "ACTION-001-STATIC",
            Self::TooManyActionParameters { .. } => "ACTION-002-TOO_MANY_PARAMETERS",
            Self::InvalidActionParameter { .. } => "ACTION-003-INVALID_PARAMETER",
            Self::DuplicateActionOverload { .. } => "ACTION-004-DUPLICATE_OVERLOAD",
            Self::MultipleIncrementalActions { .. } => "ACTION-005-MULTIPLE_INCREMENTAL",
        }
    }

    /// Returns the task type the error is attributed to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::StaticActionMethod { type_name, .. }
            | Self::TooManyActionParameters { type_name, .. }
            | Self::InvalidActionParameter { type_name, .. }
            | Self::DuplicateActionOverload { type_name, .. }
            | Self::MultipleIncrementalActions { type_name } => type_name,
        }
    }

    /// Returns diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let hint = match self {
            Self::StaticActionMethod { .. } => "Declare the action on an instance method.",
            Self::TooManyActionParameters { .. } | Self::InvalidActionParameter { .. } => {
                "Task actions take no parameters, or a single IncrementalInputs parameter."
            }
            Self::DuplicateActionOverload { .. } => {
                "Give each task action in a task type a distinct name."
            }
            Self::MultipleIncrementalActions { .. } => {
                "Only one task action per task type hierarchy may accept IncrementalInputs."
            }
        };
        ErrorInfo::new(self.code(), self.to_string())
            .with_fix_hint(hint)
            .with_context_entry("type_name", self.type_name())
    }
}

/// Errors raised while executing a task's actions.
#[derive(Debug, Error)]
pub enum ActionExecutionError {
    /// The action body returned an error.
    #[error("Execution failed for task '{task}' (action {action})")]
    ActionFailed {
        /// The task path.
        task: String,
        /// The action display name.
        action: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The task's parameters could not be isolated for lock-free execution.
    #[error("Could not isolate parameters of task '{task}'")]
    Isolation {
        /// The task path.
        task: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The isolated action logic could not be instantiated.
    #[error("Could not create isolated action {action_type} for task '{task}'")]
    Instantiation {
        /// The task path.
        task: String,
        /// The isolated action type name.
        action_type: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The task type is isolatable but the task carries no isolated parameters.
    #[error("Task '{task}' is of an isolatable type but carries no isolated parameters")]
    NotIsolatable {
        /// The task path.
        task: String,
    },

    /// An incremental task was executed without incremental inputs.
    #[error("Task '{task}' has an incremental action but no incremental inputs were supplied")]
    MissingIncrementalInputs {
        /// The task path.
        task: String,
    },
}

impl ActionExecutionError {
    /// Creates an action failed error.
    #[must_use]
    pub fn action_failed(
        task: impl Into<String>,
        action: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::ActionFailed {
            task: task.into(),
            action: action.into(),
            source,
        }
    }

    /// Creates an isolation error.
    #[must_use]
    pub fn isolation(task: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Isolation {
            task: task.into(),
            source: source.into(),
        }
    }

    /// Returns the path of the task that failed.
    #[must_use]
    pub fn task(&self) -> &str {
        match self {
            Self::ActionFailed { task, .. }
            | Self::Isolation { task, .. }
            | Self::Instantiation { task, .. }
            | Self::NotIsolatable { task }
            | Self::MissingIncrementalInputs { task } => task,
        }
    }
}
