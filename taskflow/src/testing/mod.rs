//! Testing utilities for dependency resolution and task execution.
//!
//! This module provides:
//! - Task and task type fixtures
//! - Contributor doubles that succeed or fail on demand
//! - Assertions over resolution results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_completed_actions, assert_failure_declarations, assert_resolved_tasks,
};
pub use fixtures::{plain_type, task, task_of, ActionRecorder};
pub use mocks::{FailingBuildable, FailingTaskDependency, StaticBuildable};
