//! Per-task dependency resolution.

use super::{Dependency, ResolutionFailure, TaskDependencyResolveContext};
use crate::config::{ResolutionConfig, SelfDependencyPolicy};
use crate::core::{ScheduledNode, TaskRef};
use crate::errors::UnsupportedDependencyError;
use std::sync::Arc;
use tracing::{debug, warn};

/// The nodes and failures produced by resolving one task's dependencies.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDependencies {
    /// Discovered tasks and work actions, deduplicated by identity.
    pub nodes: Vec<ScheduledNode>,
    /// Traversal failures, in visit order.
    pub failures: Vec<ResolutionFailure>,
    /// Declarations with an unrecognized shape, in declaration order.
    ///
    /// Each one aborted only its own `add`; the sibling declarations were
    /// still expanded.
    pub unsupported: Vec<UnsupportedDependencyError>,
}

impl ResolvedDependencies {
    /// Returns the discovered task nodes.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskRef> {
        self.nodes
            .iter()
            .filter_map(ScheduledNode::as_task)
            .cloned()
            .collect()
    }

    /// Returns true if `task` was discovered.
    #[must_use]
    pub fn contains_task(&self, task: &TaskRef) -> bool {
        self.nodes
            .iter()
            .filter_map(ScheduledNode::as_task)
            .any(|t| t.id() == task.id())
    }

    /// Returns true if any traversal failure was recorded.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns true if any declaration had an unrecognized shape.
    #[must_use]
    pub fn has_unsupported(&self) -> bool {
        !self.unsupported.is_empty()
    }

    /// Returns the first unsupported declaration as an error, keeping the
    /// result otherwise.
    ///
    /// # Errors
    ///
    /// Returns the first [`UnsupportedDependencyError`] collected.
    pub fn into_result(mut self) -> Result<Self, UnsupportedDependencyError> {
        if self.unsupported.is_empty() {
            Ok(self)
        } else {
            Err(self.unsupported.remove(0))
        }
    }

    /// Returns the number of discovered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no nodes were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Expands the declared dependencies of tasks into schedulable nodes.
#[derive(Debug, Clone, Default)]
pub struct TaskDependencyResolver {
    config: ResolutionConfig,
}

impl TaskDependencyResolver {
    /// Creates a resolver with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with the given configuration.
    #[must_use]
    pub fn with_config(config: ResolutionConfig) -> Self {
        Self { config }
    }

    /// Resolves the declared dependencies of `task`.
    ///
    /// The task itself is never part of the result; how a self-dependency is
    /// reported is governed by [`SelfDependencyPolicy`]. A declaration with an
    /// unrecognized shape is collected in
    /// [`unsupported`](ResolvedDependencies::unsupported) and the remaining
    /// declarations are still expanded.
    pub fn resolve(&self, task: &TaskRef) -> ResolvedDependencies {
        let mut context = TaskDependencyResolveContext::for_task(task);
        let unsupported = add_all(&mut context, task.declared_dependencies());

        let owner_key = ScheduledNode::Task(Arc::clone(task)).key();
        if context.contains(&owner_key) && self.config.self_dependency == SelfDependencyPolicy::Report {
            context.visit_failure(anyhow::anyhow!("{task} depends on itself"));
        }

        let (mut nodes, failures) = context.into_parts();
        nodes.retain(|node| {
            let is_owner = node.key() == owner_key;
            if is_owner {
                warn!(task = task.path(), "Ignoring dependency of task on itself");
            }
            !is_owner
        });

        debug!(
            task = task.path(),
            nodes = nodes.len(),
            failures = failures.len(),
            unsupported = unsupported.len(),
            "Resolved task dependencies"
        );
        ResolvedDependencies {
            nodes,
            failures,
            unsupported,
        }
    }

    /// Resolves a list of declarations that have no owning task.
    pub fn resolve_root(
        &self,
        declarations: impl IntoIterator<Item = Dependency>,
    ) -> ResolvedDependencies {
        let mut context = TaskDependencyResolveContext::new(None);
        let unsupported = add_all(&mut context, declarations);
        let (nodes, failures) = context.into_parts();
        ResolvedDependencies {
            nodes,
            failures,
            unsupported,
        }
    }
}

fn add_all(
    context: &mut TaskDependencyResolveContext,
    declarations: impl IntoIterator<Item = Dependency>,
) -> Vec<UnsupportedDependencyError> {
    let mut unsupported = Vec::new();
    for dependency in declarations {
        if let Err(err) = context.add(dependency) {
            warn!(error = %err, "Skipping unsupported dependency declaration");
            unsupported.push(err);
        }
    }
    unsupported
}
