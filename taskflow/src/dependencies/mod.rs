//! Dependency declarations and their resolution into schedulable nodes.
//!
//! This module provides:
//! - The closed `Dependency` declaration type and its contributor traits
//! - A resolve context that accumulates nodes and traversal failures
//! - A per-task resolver built on top of the context

mod context;
mod declaration;
mod resolver;

pub use context::{ResolutionFailure, TaskDependencyResolveContext};
pub use declaration::{
    Buildable, Dependency, DependencyContainer, DependencySet, OpaqueValue, TaskDependency,
    TaskSet, TransformationDependency,
};
pub use resolver::{ResolvedDependencies, TaskDependencyResolver};
