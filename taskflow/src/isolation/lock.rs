//! The project lock serializing access to shared build state.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record of an action that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedAction {
    /// Path of the task the action belongs to.
    pub task: String,
    /// Display name of the action.
    pub action: String,
    /// When the action completed.
    pub completed_at: DateTime<Utc>,
}

/// Mutable build state guarded by the [`ProjectLock`].
#[derive(Debug, Default)]
pub struct ProjectState {
    completed: Vec<CompletedAction>,
}

impl ProjectState {
    /// Records a completed action.
    pub fn record_completed(&mut self, task: impl Into<String>, action: impl Into<String>) {
        self.completed.push(CompletedAction {
            task: task.into(),
            action: action.into(),
            completed_at: Utc::now(),
        });
    }

    /// Returns the completed actions in completion order.
    #[must_use]
    pub fn completed_actions(&self) -> &[CompletedAction] {
        &self.completed
    }
}

/// Serializing lock held by whoever mutates project state.
#[derive(Debug, Default)]
pub struct ProjectLock {
    state: Mutex<ProjectState>,
}

impl ProjectLock {
    /// Creates an unlocked project lock with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, blocking until it is available.
    pub fn lock(&self) -> ProjectLockGuard<'_> {
        ProjectLockGuard {
            guard: self.state.lock(),
        }
    }

    /// Acquires the lock if it is free.
    pub fn try_lock(&self) -> Option<ProjectLockGuard<'_>> {
        self.state
            .try_lock()
            .map(|guard| ProjectLockGuard { guard })
    }

    /// Returns true if the lock is currently held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }
}

/// Holds the [`ProjectLock`]; releases it on drop.
pub struct ProjectLockGuard<'a> {
    guard: MutexGuard<'a, ProjectState>,
}

impl ProjectLockGuard<'_> {
    /// Returns the guarded state.
    #[must_use]
    pub fn state(&self) -> &ProjectState {
        &self.guard
    }

    /// Returns the guarded state mutably.
    pub fn state_mut(&mut self) -> &mut ProjectState {
        &mut self.guard
    }

    /// Releases the lock while `f` runs and reacquires it afterwards.
    ///
    /// The lock is reacquired even if `f` panics.
    pub fn unlocked<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        MutexGuard::unlocked(&mut self.guard, f)
    }
}

impl fmt::Debug for ProjectLockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectLockGuard")
            .field("completed", &self.guard.completed.len())
            .finish()
    }
}
