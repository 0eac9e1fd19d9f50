//! Task type definitions: explicit descriptor tables of action methods.

use super::IncrementalInputs;
use crate::core::TaskNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The callable body of an action method.
///
/// Standard actions are invoked with `None`; incremental actions always
/// receive inputs.
pub type ActionBody =
    Arc<dyn Fn(&TaskNode, Option<&IncrementalInputs>) -> anyhow::Result<()> + Send + Sync>;

/// Stable identity of a task type for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskTypeId(Uuid);

impl fmt::Display for TaskTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The declared type of an action method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// The incremental-inputs marker type.
    IncrementalInputs,
    /// Any other type, by name.
    Named(String),
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncrementalInputs => write!(f, "IncrementalInputs"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A method declared as a task action.
#[derive(Clone)]
pub struct ActionMethod {
    name: String,
    is_static: bool,
    parameters: Vec<ParameterType>,
    body: ActionBody,
}

impl ActionMethod {
    /// Declares a parameterless action.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&TaskNode) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_static: false,
            parameters: Vec::new(),
            body: Arc::new(move |task: &TaskNode, _: Option<&IncrementalInputs>| body(task)),
        }
    }

    /// Declares an action taking a single incremental-inputs parameter.
    pub fn incremental<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&TaskNode, &IncrementalInputs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_static: false,
            parameters: vec![ParameterType::IncrementalInputs],
            body: Arc::new(move |task: &TaskNode, inputs: Option<&IncrementalInputs>| match inputs {
                Some(inputs) => body(task, inputs),
                None => body(task, &IncrementalInputs::rebuild()),
            }),
        }
    }

    /// Overrides the declared parameter list.
    #[must_use]
    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = ParameterType>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    /// Marks the method as static.
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the method is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterType] {
        &self.parameters
    }

    pub(crate) fn invoke(
        &self,
        task: &TaskNode,
        inputs: Option<&IncrementalInputs>,
    ) -> anyhow::Result<()> {
        (self.body)(task, inputs)
    }
}

impl fmt::Debug for ActionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMethod")
            .field("name", &self.name)
            .field("is_static", &self.is_static)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// The definition of a task implementation type.
///
/// Types form a single-inheritance hierarchy through [`parent`](Self::parent).
/// Action methods are listed in declaration order.
#[derive(Debug)]
pub struct TaskType {
    id: TaskTypeId,
    name: String,
    parent: Option<Arc<TaskType>>,
    cacheable: bool,
    isolatable: bool,
    methods: Vec<ActionMethod>,
}

impl TaskType {
    /// Starts a new task type definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TaskTypeBuilder {
        TaskTypeBuilder {
            name: name.into(),
            parent: None,
            cacheable: false,
            isolatable: false,
            methods: Vec::new(),
        }
    }

    /// Returns the type id.
    #[must_use]
    pub fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent type.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<TaskType>> {
        self.parent.as_ref()
    }

    /// Returns true if this type itself is marked as cacheable.
    ///
    /// The marker is not inherited.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Returns true if this type or any ancestor has the isolatable
    /// capability.
    #[must_use]
    pub fn is_isolatable(&self) -> bool {
        self.hierarchy().any(|t| t.isolatable)
    }

    /// Returns the action methods declared directly on this type.
    #[must_use]
    pub fn declared_methods(&self) -> &[ActionMethod] {
        &self.methods
    }

    /// Iterates this type and its ancestors, most-derived first.
    pub fn hierarchy(&self) -> impl Iterator<Item = &TaskType> {
        std::iter::successors(Some(self), |t| t.parent.as_deref())
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Builder for [`TaskType`].
#[derive(Debug)]
pub struct TaskTypeBuilder {
    name: String,
    parent: Option<Arc<TaskType>>,
    cacheable: bool,
    isolatable: bool,
    methods: Vec<ActionMethod>,
}

impl TaskTypeBuilder {
    /// Sets the parent type.
    #[must_use]
    pub fn extends(mut self, parent: &Arc<TaskType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Marks the type as cacheable.
    #[must_use]
    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    /// Gives the type the isolatable capability.
    #[must_use]
    pub fn isolatable(mut self) -> Self {
        self.isolatable = true;
        self
    }

    /// Declares an action method.
    #[must_use]
    pub fn action(mut self, method: ActionMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(self) -> Arc<TaskType> {
        Arc::new(TaskType {
            id: TaskTypeId(Uuid::new_v4()),
            name: self.name,
            parent: self.parent,
            cacheable: self.cacheable,
            isolatable: self.isolatable,
            methods: self.methods,
        })
    }
}
