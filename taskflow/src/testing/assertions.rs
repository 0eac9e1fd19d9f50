//! Test assertions for resolution and execution results.

use crate::core::TaskRef;
use crate::dependencies::ResolvedDependencies;
use crate::isolation::ProjectState;
use std::collections::BTreeSet;

/// Asserts that exactly `expected` were resolved as tasks, in any order.
pub fn assert_resolved_tasks(resolved: &ResolvedDependencies, expected: &[&TaskRef]) {
    let actual: BTreeSet<String> = resolved.tasks().iter().map(|t| t.path().to_string()).collect();
    let wanted: BTreeSet<String> = expected.iter().map(|t| t.path().to_string()).collect();
    assert_eq!(
        actual, wanted,
        "Expected resolved tasks {wanted:?}, got {actual:?}"
    );
    assert_eq!(
        resolved.tasks().len(),
        expected.len(),
        "Resolved task list contains duplicates"
    );
}

/// Asserts the declarations of the recorded failures, in visit order.
pub fn assert_failure_declarations(resolved: &ResolvedDependencies, expected: &[&str]) {
    let actual: Vec<&str> = resolved
        .failures
        .iter()
        .map(|f| f.declaration.as_str())
        .collect();
    assert_eq!(
        actual, expected,
        "Expected failures for {expected:?}, got {actual:?}"
    );
}

/// Asserts the `(task, action)` pairs recorded as completed, in order.
pub fn assert_completed_actions(state: &ProjectState, expected: &[(&str, &str)]) {
    let actual: Vec<(&str, &str)> = state
        .completed_actions()
        .iter()
        .map(|c| (c.task.as_str(), c.action.as_str()))
        .collect();
    assert_eq!(
        actual, expected,
        "Expected completed actions {expected:?}, got {actual:?}"
    );
}
