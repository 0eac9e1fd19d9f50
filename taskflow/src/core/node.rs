//! The union of schedulable units produced by dependency resolution.

use super::{TaskId, TaskRef, WorkAction};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Identity key of a [`ScheduledNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// A task node.
    Task(TaskId),
    /// A work action.
    Work(Uuid),
}

/// A unit the scheduler can place in the graph.
#[derive(Debug, Clone)]
pub enum ScheduledNode {
    /// A task node.
    Task(TaskRef),
    /// A finalize action or work-node action.
    Work(Arc<WorkAction>),
}

impl ScheduledNode {
    /// Returns the identity key.
    #[must_use]
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Task(task) => NodeKey::Task(task.id()),
            Self::Work(action) => NodeKey::Work(action.id()),
        }
    }

    /// Returns the task, if this node is one.
    #[must_use]
    pub fn as_task(&self) -> Option<&TaskRef> {
        match self {
            Self::Task(task) => Some(task),
            Self::Work(_) => None,
        }
    }

    /// Returns the work action, if this node is one.
    #[must_use]
    pub fn as_work(&self) -> Option<&Arc<WorkAction>> {
        match self {
            Self::Task(_) => None,
            Self::Work(action) => Some(action),
        }
    }

    /// Returns true if this node is a task.
    #[must_use]
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task(_))
    }
}

impl PartialEq for ScheduledNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledNode {}

impl Hash for ScheduledNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ScheduledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(task) => write!(f, "{task}"),
            Self::Work(action) => write!(f, "{action}"),
        }
    }
}

impl From<TaskRef> for ScheduledNode {
    fn from(task: TaskRef) -> Self {
        Self::Task(task)
    }
}

impl From<Arc<WorkAction>> for ScheduledNode {
    fn from(action: Arc<WorkAction>) -> Self {
        Self::Work(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TaskType;
    use crate::core::{TaskNode, WorkActionKind};

    #[test]
    fn test_node_keys_distinguish_kinds() {
        let task = TaskNode::new(":a", TaskType::builder("Plain").build()).into_ref();
        let work = WorkAction::finalize("cleanup");

        let task_node = ScheduledNode::from(task.clone());
        let work_node = ScheduledNode::from(work.clone());

        assert_eq!(task_node.key(), NodeKey::Task(task.id()));
        assert_eq!(work_node.key(), NodeKey::Work(work.id()));
        assert!(task_node.is_task());
        assert!(!work_node.is_task());
        assert_eq!(work_node.as_work().map(|w| w.kind()), Some(WorkActionKind::Finalize));
    }

    #[test]
    fn test_node_equality_is_by_identity() {
        let task = TaskNode::new(":a", TaskType::builder("Plain").build()).into_ref();
        assert_eq!(ScheduledNode::Task(task.clone()), ScheduledNode::Task(task));

        let first = WorkAction::work_node("publish");
        let second = WorkAction::work_node("publish");
        assert_ne!(ScheduledNode::Work(first), ScheduledNode::Work(second));
    }

    #[test]
    fn test_display() {
        let work = ScheduledNode::Work(WorkAction::finalize("report"));
        assert_eq!(work.to_string(), "finalize action 'report'");
    }
}
