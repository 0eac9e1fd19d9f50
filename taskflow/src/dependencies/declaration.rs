//! Dependency declarations and the contributor traits they dispatch to.

use super::TaskDependencyResolveContext;
use crate::core::{TaskRef, WorkAction};
use crate::errors::UnsupportedDependencyError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A collection of task nodes, possibly computed on demand.
pub trait TaskDependency: Send + Sync {
    /// Returns the tasks contributed for `owner`.
    ///
    /// # Errors
    ///
    /// Any error is recorded as a traversal failure by the resolve context.
    fn dependencies(&self, owner: Option<&TaskRef>) -> anyhow::Result<Vec<TaskRef>>;

    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> String {
        "task collection".to_string()
    }
}

/// A value that describes its own dependencies by visiting a resolve context.
///
/// Implementations call [`TaskDependencyResolveContext::add`],
/// [`maybe_add`](TaskDependencyResolveContext::maybe_add) and
/// [`visit_failure`](TaskDependencyResolveContext::visit_failure) on the
/// context they are given; nested values accumulate into the same context.
pub trait DependencyContainer: Send + Sync {
    /// Visits the dependencies of this container.
    ///
    /// # Errors
    ///
    /// Returns an error when a nested `add` was given an unsupported value.
    fn visit_dependencies(
        &self,
        context: &mut TaskDependencyResolveContext,
    ) -> Result<(), UnsupportedDependencyError>;

    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> String {
        "dependency container".to_string()
    }
}

/// A value that is produced by tasks and can report which ones.
pub trait Buildable: Send + Sync {
    /// Returns the dependency that builds this value.
    ///
    /// # Errors
    ///
    /// Any error is recorded as a traversal failure by the resolve context.
    fn build_dependencies(&self) -> anyhow::Result<Dependency>;

    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> String {
        "buildable".to_string()
    }
}

/// A dependency on an artifact transformation.
///
/// The expansion is defined entirely by the producer.
pub trait TransformationDependency: Send + Sync {
    /// Visits the nodes this transformation depends on.
    ///
    /// # Errors
    ///
    /// Returns an error when a nested `add` was given an unsupported value.
    fn visit_dependencies(
        &self,
        context: &mut TaskDependencyResolveContext,
    ) -> Result<(), UnsupportedDependencyError>;

    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> String {
        "transformation".to_string()
    }
}

/// A value of a shape that cannot contribute dependencies.
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    description: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    /// Returns the type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the debug rendering of the wrapped value.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Attempts to view the wrapped value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub(crate) fn to_error(&self) -> UnsupportedDependencyError {
        UnsupportedDependencyError::new(self.type_name, &self.description)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("type_name", &self.type_name)
            .field("description", &self.description)
            .finish()
    }
}

/// A declared dependency of a task.
///
/// The variant determines how the declaration is expanded into task nodes and
/// work actions. `Other` is the catch-all for values of any other shape.
#[derive(Clone)]
pub enum Dependency {
    /// A concrete task node.
    Task(TaskRef),
    /// A collection of task nodes.
    Tasks(Arc<dyn TaskDependency>),
    /// A self-describing dependency contributor.
    Container(Arc<dyn DependencyContainer>),
    /// A value built by tasks.
    Buildable(Arc<dyn Buildable>),
    /// An artifact transformation dependency.
    Transformation(Arc<dyn TransformationDependency>),
    /// A finalize action or work-node action.
    Work(Arc<WorkAction>),
    /// A value of an unrecognized shape.
    Other(OpaqueValue),
}

impl Dependency {
    /// Declares a fixed collection of tasks.
    #[must_use]
    pub fn tasks(tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        Self::Tasks(Arc::new(TaskSet::new(tasks)))
    }

    /// Declares a self-describing contributor.
    #[must_use]
    pub fn container(container: impl DependencyContainer + 'static) -> Self {
        Self::Container(Arc::new(container))
    }

    /// Declares a buildable value.
    #[must_use]
    pub fn buildable(buildable: impl Buildable + 'static) -> Self {
        Self::Buildable(Arc::new(buildable))
    }

    /// Declares a transformation dependency.
    #[must_use]
    pub fn transformation(transformation: impl TransformationDependency + 'static) -> Self {
        Self::Transformation(Arc::new(transformation))
    }

    /// Declares a finalize action.
    #[must_use]
    pub fn finalize(description: impl Into<String>) -> Self {
        Self::Work(WorkAction::finalize(description))
    }

    /// Declares a work-node action.
    #[must_use]
    pub fn work_node(description: impl Into<String>) -> Self {
        Self::Work(WorkAction::work_node(description))
    }

    /// Wraps an arbitrary value that is not a dependency.
    #[must_use]
    pub fn other<T: Any + Send + Sync + fmt::Debug>(value: T) -> Self {
        Self::Other(OpaqueValue {
            type_name: std::any::type_name::<T>(),
            description: format!("{value:?}"),
            value: Arc::new(value),
        })
    }

    /// Returns true if the declaration has a recognized shape.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Describes the declaration for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Task(task) => task.to_string(),
            Self::Tasks(tasks) => tasks.display_name(),
            Self::Container(container) => container.display_name(),
            Self::Buildable(buildable) => buildable.display_name(),
            Self::Transformation(transformation) => transformation.display_name(),
            Self::Work(action) => action.to_string(),
            Self::Other(value) => format!("{} ({})", value.description, value.type_name),
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(task) => f.debug_tuple("Task").field(&task.path()).finish(),
            Self::Tasks(tasks) => f.debug_tuple("Tasks").field(&tasks.display_name()).finish(),
            Self::Container(c) => f.debug_tuple("Container").field(&c.display_name()).finish(),
            Self::Buildable(b) => f.debug_tuple("Buildable").field(&b.display_name()).finish(),
            Self::Transformation(t) => {
                f.debug_tuple("Transformation").field(&t.display_name()).finish()
            }
            Self::Work(action) => f.debug_tuple("Work").field(action).finish(),
            Self::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

impl From<TaskRef> for Dependency {
    fn from(task: TaskRef) -> Self {
        Self::Task(task)
    }
}

impl From<&TaskRef> for Dependency {
    fn from(task: &TaskRef) -> Self {
        Self::Task(Arc::clone(task))
    }
}

impl From<Arc<WorkAction>> for Dependency {
    fn from(action: Arc<WorkAction>) -> Self {
        Self::Work(action)
    }
}

/// A [`TaskDependency`] over a fixed list of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<TaskRef>,
}

impl TaskSet {
    /// Creates a task set.
    #[must_use]
    pub fn new(tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskDependency for TaskSet {
    fn dependencies(&self, _owner: Option<&TaskRef>) -> anyhow::Result<Vec<TaskRef>> {
        Ok(self.tasks.clone())
    }

    fn display_name(&self) -> String {
        let paths: Vec<_> = self.tasks.iter().map(|t| t.path()).collect();
        format!("task set [{}]", paths.join(", "))
    }
}

/// A [`DependencyContainer`] over a list of mixed declarations.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    values: Vec<Dependency>,
}

impl DependencySet {
    /// Creates an empty dependency set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration.
    #[must_use]
    pub fn with(mut self, dependency: impl Into<Dependency>) -> Self {
        self.values.push(dependency.into());
        self
    }

    /// Returns the declarations.
    #[must_use]
    pub fn values(&self) -> &[Dependency] {
        &self.values
    }
}

impl DependencyContainer for DependencySet {
    fn visit_dependencies(
        &self,
        context: &mut TaskDependencyResolveContext,
    ) -> Result<(), UnsupportedDependencyError> {
        for value in &self.values {
            context.add(value.clone())?;
        }
        Ok(())
    }

    fn display_name(&self) -> String {
        format!("dependency set of {} values", self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TaskType;
    use crate::core::TaskNode;

    #[test]
    fn test_other_captures_type_and_value() {
        let dependency = Dependency::other("not-a-dependency-string");
        assert!(!dependency.is_supported());

        let Dependency::Other(value) = &dependency else {
            panic!("expected an opaque value");
        };
        assert_eq!(value.type_name(), "&str");
        assert_eq!(value.description(), "\"not-a-dependency-string\"");
        assert_eq!(value.downcast_ref::<&str>(), Some(&"not-a-dependency-string"));
    }

    #[test]
    fn test_describe() {
        let task = TaskNode::new(":lib:jar", TaskType::builder("Jar").build()).into_ref();
        assert_eq!(Dependency::from(&task).describe(), "task ':lib:jar'");
        assert_eq!(
            Dependency::tasks([task]).describe(),
            "task set [:lib:jar]"
        );
        assert_eq!(
            Dependency::work_node("publish").describe(),
            "work node action 'publish'"
        );
        assert_eq!(Dependency::other(7_u8).describe(), "7 (u8)");
    }

    #[test]
    fn test_dependency_set_builder() {
        let set = DependencySet::new()
            .with(Dependency::finalize("a"))
            .with(Dependency::other(1_i32));
        assert_eq!(set.values().len(), 2);
        assert_eq!(set.display_name(), "dependency set of 2 values");
    }
}
