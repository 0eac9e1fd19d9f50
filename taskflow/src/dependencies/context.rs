//! The accumulator that expands dependency declarations into nodes.

use super::Dependency;
use crate::core::{NodeKey, ScheduledNode, TaskRef};
use crate::errors::UnsupportedDependencyError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

const UNKNOWN_DECLARATION: &str = "<top-level>";

/// A failure encountered while traversing into a recognized dependency.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    /// Description of the declaration being visited when the failure occurred.
    pub declaration: String,
    /// The failure.
    pub cause: Arc<anyhow::Error>,
    /// When the failure was visited.
    pub occurred_at: DateTime<Utc>,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.declaration, self.cause)
    }
}

/// Accumulates the nodes reachable from a set of dependency declarations.
///
/// One context serves one expansion request. Nested contributors receive the
/// same context, so results and failures for the whole sub-tree land in one
/// place. The context is not shared between threads.
#[derive(Debug, Default)]
pub struct TaskDependencyResolveContext {
    task: Option<TaskRef>,
    nodes: Vec<ScheduledNode>,
    seen: HashSet<NodeKey>,
    visited_contributors: HashSet<usize>,
    retained: Vec<Dependency>,
    failures: Vec<ResolutionFailure>,
    visiting: Vec<String>,
}

impl TaskDependencyResolveContext {
    /// Creates a context for the dependencies of `task`, or a root-level
    /// context when `task` is `None`.
    #[must_use]
    pub fn new(task: Option<TaskRef>) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    /// Creates a context owned by `task`.
    #[must_use]
    pub fn for_task(task: &TaskRef) -> Self {
        Self::new(Some(Arc::clone(task)))
    }

    /// Returns the task whose dependencies are being visited.
    #[must_use]
    pub fn task(&self) -> Option<&TaskRef> {
        self.task.as_ref()
    }

    /// Adds a dependency declaration.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedDependencyError`] when `dependency`, or a value
    /// nested contributors add on its behalf, has an unrecognized shape.
    /// Nodes recorded before the error stay recorded.
    pub fn add(&mut self, dependency: impl Into<Dependency>) -> Result<(), UnsupportedDependencyError> {
        self.expand(dependency.into())
    }

    /// Adds a declaration that may or may not be a dependency.
    ///
    /// A value of an unrecognized shape is ignored. Recognized shapes expand
    /// exactly as with [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns an error only when a recognized contributor itself adds an
    /// unsupported value.
    pub fn maybe_add(
        &mut self,
        dependency: impl Into<Dependency>,
    ) -> Result<(), UnsupportedDependencyError> {
        match dependency.into() {
            Dependency::Other(value) => {
                trace!(
                    type_name = value.type_name(),
                    "Ignoring value that is not a dependency"
                );
                Ok(())
            }
            dependency => self.expand(dependency),
        }
    }

    /// Records a failure to visit the dependencies of the declaration
    /// currently being expanded. The walk continues.
    pub fn visit_failure(&mut self, cause: impl Into<anyhow::Error>) {
        let cause = cause.into();
        let declaration = self
            .visiting
            .last()
            .map_or_else(|| UNKNOWN_DECLARATION.to_string(), Clone::clone);
        debug!(
            task = self.owner_path().as_deref(),
            declaration = %declaration,
            error = %cause,
            "Failed to visit dependency"
        );
        self.failures.push(ResolutionFailure {
            declaration,
            cause: Arc::new(cause),
            occurred_at: Utc::now(),
        });
    }

    /// Returns the nodes discovered so far.
    #[must_use]
    pub fn nodes(&self) -> &[ScheduledNode] {
        &self.nodes
    }

    /// Returns the task nodes discovered so far.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskRef> {
        self.nodes.iter().filter_map(ScheduledNode::as_task)
    }

    /// Returns true if the node identified by `key` has been discovered.
    #[must_use]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.seen.contains(key)
    }

    /// Returns the failures visited so far, in visit order.
    #[must_use]
    pub fn failures(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    /// Consumes the context, returning the discovered nodes and failures.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ScheduledNode>, Vec<ResolutionFailure>) {
        (self.nodes, self.failures)
    }

    fn expand(&mut self, dependency: Dependency) -> Result<(), UnsupportedDependencyError> {
        if let Some(key) = contributor_key(&dependency) {
            if !self.visited_contributors.insert(key) {
                return Ok(());
            }
            // Keep the allocation alive so its address cannot be reused.
            self.retained.push(dependency.clone());
        }

        match dependency {
            Dependency::Task(task) => {
                self.record(ScheduledNode::Task(task));
                Ok(())
            }
            Dependency::Work(action) => {
                self.record(ScheduledNode::Work(action));
                Ok(())
            }
            Dependency::Tasks(tasks) => {
                self.visiting(tasks.display_name(), |ctx| {
                    match tasks.dependencies(ctx.task.as_ref()) {
                        Ok(found) => found
                            .into_iter()
                            .for_each(|task| ctx.record(ScheduledNode::Task(task))),
                        Err(cause) => ctx.visit_failure(cause),
                    }
                    Ok(())
                })
            }
            Dependency::Container(container) => {
                self.visiting(container.display_name(), |ctx| {
                    container.visit_dependencies(ctx)
                })
            }
            Dependency::Buildable(buildable) => {
                self.visiting(buildable.display_name(), |ctx| {
                    match buildable.build_dependencies() {
                        Ok(built) => ctx.expand(built),
                        Err(cause) => {
                            ctx.visit_failure(cause);
                            Ok(())
                        }
                    }
                })
            }
            Dependency::Transformation(transformation) => {
                self.visiting(transformation.display_name(), |ctx| {
                    transformation.visit_dependencies(ctx)
                })
            }
            Dependency::Other(value) => Err(value.to_error().with_owner(self.owner_path())),
        }
    }

    fn visiting<R>(&mut self, description: String, visit: impl FnOnce(&mut Self) -> R) -> R {
        self.visiting.push(description);
        let result = visit(self);
        self.visiting.pop();
        result
    }

    fn record(&mut self, node: ScheduledNode) {
        if self.seen.insert(node.key()) {
            trace!(node = %node, "Resolved dependency node");
            self.nodes.push(node);
        }
    }

    fn owner_path(&self) -> Option<String> {
        self.task.as_ref().map(|task| task.path().to_string())
    }
}

// Contributors are deduplicated by allocation so that cyclic or repeated
// contributor graphs expand once per context.
fn contributor_key(dependency: &Dependency) -> Option<usize> {
    fn address<T: ?Sized>(contributor: &Arc<T>) -> usize {
        Arc::as_ptr(contributor).cast::<()>() as usize
    }

    match dependency {
        Dependency::Tasks(tasks) => Some(address(tasks)),
        Dependency::Container(container) => Some(address(container)),
        Dependency::Buildable(buildable) => Some(address(buildable)),
        Dependency::Transformation(transformation) => Some(address(transformation)),
        Dependency::Task(_) | Dependency::Work(_) | Dependency::Other(_) => None,
    }
}
