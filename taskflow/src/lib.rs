//! # Taskflow
//!
//! The dependency-resolution and action-dispatch core of a build engine.
//!
//! Taskflow provides:
//!
//! - **Dependency resolution**: expand heterogeneous dependency declarations
//!   into a flat set of schedulable nodes, collecting failures as data
//! - **Action metadata**: validate task types' action declarations once per
//!   type and cache the resulting ordered action factories
//! - **Isolated execution**: run action logic for isolatable tasks against a
//!   parameter snapshot, without holding the project lock
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskflow::prelude::*;
//!
//! let compile = TaskType::builder("Compile")
//!     .action(ActionMethod::new("compile", |task| {
//!         println!("compiling {}", task.path());
//!         Ok(())
//!     }))
//!     .build();
//!
//! let lib = TaskNode::new(":lib:compile", compile.clone()).into_ref();
//! let app = TaskNode::new(":app:compile", compile).into_ref();
//! app.depends_on(&lib);
//!
//! let resolved = TaskDependencyResolver::new().resolve(&app);
//! assert!(resolved.contains_task(&lib));
//!
//! let executer = TaskActionExecuter::new(
//!     Arc::new(ProjectLock::new()),
//!     Arc::new(TaskClassInfoStore::new()),
//! );
//! executer.execute(&app, None)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod actions;
pub mod config;
pub mod core;
pub mod dependencies;
pub mod errors;
pub mod execution;
pub mod isolation;
pub mod logging;
pub mod observability;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::{
        ActionKind, ActionMethod, ChangeKind, IncrementalInputs, InputChange, TaskClassInfo,
        TaskClassInfoStore, TaskType,
    };
    pub use crate::config::{ExecutionConfig, LoggingConfig, ResolutionConfig, TaskflowConfig};
    pub use crate::core::{ScheduledNode, TaskId, TaskNode, TaskRef, WorkAction};
    pub use crate::dependencies::{
        Buildable, Dependency, DependencyContainer, DependencySet, ResolvedDependencies,
        TaskDependency, TaskDependencyResolveContext, TaskDependencyResolver, TaskSet,
        TransformationDependency,
    };
    pub use crate::errors::{
        ActionExecutionError, ActionMetadataError, ErrorInfo, TaskflowError,
        UnsupportedDependencyError,
    };
    pub use crate::execution::{TaskActionExecuter, TaskExecutionOutcome};
    pub use crate::isolation::{
        Instantiator, IsolatedAction, IsolatedActionType, IsolatedParameters, ProjectLock,
        Services,
    };
    pub use crate::logging::init_logging;
}
