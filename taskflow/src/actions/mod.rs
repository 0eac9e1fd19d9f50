//! Task action metadata.
//!
//! Task types declare their actions through explicit descriptor tables
//! ([`TaskType::builder`]). The [`TaskClassInfoStore`] validates those tables
//! once per type and produces the ordered list of action factories used to
//! execute tasks of that type.

mod factory;
mod inputs;
mod store;
#[cfg(test)]
mod store_tests;
mod task_type;

pub use factory::{
    ActionContext, ActionKind, IncrementalTaskActionFactory, StandardTaskActionFactory,
    TaskAction, TaskActionFactory,
};
pub use inputs::{ChangeKind, IncrementalInputs, InputChange};
pub use store::{TaskClassInfo, TaskClassInfoStore};
pub use task_type::{ActionBody, ActionMethod, ParameterType, TaskType, TaskTypeBuilder, TaskTypeId};
