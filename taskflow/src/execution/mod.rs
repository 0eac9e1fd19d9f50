//! Task action execution.

mod executer;
#[cfg(test)]
mod execution_tests;

pub use executer::{TaskActionExecuter, TaskExecutionOutcome};
