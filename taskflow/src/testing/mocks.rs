//! Contributor doubles for dependency resolution tests.

use crate::core::TaskRef;
use crate::dependencies::{Buildable, Dependency, TaskDependency};

/// A buildable that always contributes the same dependency.
#[derive(Debug, Clone)]
pub struct StaticBuildable {
    dependency: Dependency,
}

impl StaticBuildable {
    /// Creates a buildable contributing `dependency`.
    #[must_use]
    pub fn new(dependency: impl Into<Dependency>) -> Self {
        Self {
            dependency: dependency.into(),
        }
    }
}

impl Buildable for StaticBuildable {
    fn build_dependencies(&self) -> anyhow::Result<Dependency> {
        Ok(self.dependency.clone())
    }
}

/// A buildable whose contribution always fails.
#[derive(Debug, Clone)]
pub struct FailingBuildable {
    name: String,
    message: String,
}

impl FailingBuildable {
    /// Creates a failing buildable shown as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Buildable for FailingBuildable {
    fn build_dependencies(&self) -> anyhow::Result<Dependency> {
        Err(anyhow::anyhow!("{}", self.message))
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// A task collection that fails to produce its tasks.
#[derive(Debug, Clone)]
pub struct FailingTaskDependency {
    name: String,
    message: String,
}

impl FailingTaskDependency {
    /// Creates a failing task collection shown as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl TaskDependency for FailingTaskDependency {
    fn dependencies(&self, _owner: Option<&TaskRef>) -> anyhow::Result<Vec<TaskRef>> {
        Err(anyhow::anyhow!("{}", self.message))
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}
