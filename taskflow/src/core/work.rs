//! Non-task work markers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The kind of non-task work a [`WorkAction`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkActionKind {
    /// Work that runs after the tasks it finalizes.
    Finalize,
    /// A standalone node of work in the graph.
    WorkNode,
}

impl fmt::Display for WorkActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finalize => write!(f, "finalize action"),
            Self::WorkNode => write!(f, "work node action"),
        }
    }
}

/// A schedulable unit that participates in the dependency graph but carries
/// no task configuration of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkAction {
    id: Uuid,
    kind: WorkActionKind,
    description: String,
}

impl WorkAction {
    /// Creates a finalize action.
    #[must_use]
    pub fn finalize(description: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(WorkActionKind::Finalize, description))
    }

    /// Creates a work-node action.
    #[must_use]
    pub fn work_node(description: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(WorkActionKind::WorkNode, description))
    }

    fn new(kind: WorkActionKind, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            description: description.into(),
        }
    }

    /// Returns the action's identity.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the action kind.
    #[must_use]
    pub fn kind(&self) -> WorkActionKind {
        self.kind
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for WorkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.description)
    }
}
