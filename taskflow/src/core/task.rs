//! Task nodes and their identity.

use crate::actions::TaskType;
use crate::dependencies::Dependency;
use crate::isolation::IsolatedParameters;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identity of a task node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh task id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a task node.
pub type TaskRef = Arc<TaskNode>;

/// A schedulable unit of work with declared dependencies.
///
/// Equality and hashing are by [`TaskId`], so two handles to the same node
/// always compare equal and two distinct nodes never do, even when they share
/// a path.
pub struct TaskNode {
    id: TaskId,
    path: String,
    task_type: Arc<TaskType>,
    dependencies: RwLock<Vec<Dependency>>,
    isolated: Option<IsolatedParameters>,
}

impl TaskNode {
    /// Creates a new task node of the given type.
    #[must_use]
    pub fn new(path: impl Into<String>, task_type: Arc<TaskType>) -> Self {
        Self {
            id: TaskId::new(),
            path: path.into(),
            task_type,
            dependencies: RwLock::new(Vec::new()),
            isolated: None,
        }
    }

    /// Attaches parameters for isolated action execution.
    #[must_use]
    pub fn with_isolated_parameters(mut self, parameters: IsolatedParameters) -> Self {
        self.isolated = Some(parameters);
        self
    }

    /// Adds a declared dependency.
    #[must_use]
    pub fn with_dependency(self, dependency: impl Into<Dependency>) -> Self {
        self.dependencies.write().push(dependency.into());
        self
    }

    /// Wraps the node in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> TaskRef {
        Arc::new(self)
    }

    /// Returns the task id.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the task type.
    #[must_use]
    pub fn task_type(&self) -> &Arc<TaskType> {
        &self.task_type
    }

    /// Declares an additional dependency.
    ///
    /// Dependencies hold strong references. A task that depends on itself,
    /// directly or through other tasks, forms a reference cycle and is not
    /// dropped until [`clear_dependencies`](Self::clear_dependencies) is
    /// called on one of its members.
    pub fn depends_on(&self, dependency: impl Into<Dependency>) {
        self.dependencies.write().push(dependency.into());
    }

    /// Removes and returns all declared dependencies.
    pub fn clear_dependencies(&self) -> Vec<Dependency> {
        std::mem::take(&mut *self.dependencies.write())
    }

    /// Returns a copy of the declared dependencies, in declaration order.
    #[must_use]
    pub fn declared_dependencies(&self) -> Vec<Dependency> {
        self.dependencies.read().clone()
    }

    /// Returns the isolated parameters, if the task carries any.
    #[must_use]
    pub fn isolated_parameters(&self) -> Option<&IsolatedParameters> {
        self.isolated.as_ref()
    }
}

impl PartialEq for TaskNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskNode {}

impl Hash for TaskNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("task_type", &self.task_type.name())
            .field("dependency_count", &self.dependencies.read().len())
            .field("isolated", &self.isolated.is_some())
            .finish()
    }
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}'", self.path)
    }
}
