//! Incremental inputs handed to incremental task actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an input changed since the last successful execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The input did not exist before.
    Added,
    /// The input's content changed.
    Modified,
    /// The input no longer exists.
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// A single changed input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputChange {
    /// The input's path.
    pub path: String,
    /// How it changed.
    pub kind: ChangeKind,
}

impl InputChange {
    /// Creates a new input change.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Which inputs changed since a task's last successful execution.
///
/// Produced by an external incremental-state tracker; this crate only passes
/// it through to the incremental action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncrementalInputs {
    incremental: bool,
    changes: Vec<InputChange>,
}

impl IncrementalInputs {
    /// Inputs for a full, non-incremental rebuild.
    #[must_use]
    pub fn rebuild() -> Self {
        Self::default()
    }

    /// Inputs describing an incremental execution with the given changes.
    #[must_use]
    pub fn changes(changes: impl IntoIterator<Item = InputChange>) -> Self {
        Self {
            incremental: true,
            changes: changes.into_iter().collect(),
        }
    }

    /// Returns true if only the listed changes need processing.
    #[must_use]
    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// Returns the changed inputs.
    #[must_use]
    pub fn changed(&self) -> &[InputChange] {
        &self.changes
    }

    /// Returns the changes of the given kind.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &InputChange> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }
}
