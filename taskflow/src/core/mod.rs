//! Core node model for the taskflow dispatch core.
//!
//! This module contains the schedulable units that dependency resolution
//! produces:
//! - Task nodes with identity, type, and declared dependencies
//! - Work actions (finalize actions and work-node actions)
//! - The `ScheduledNode` union used in resolution results

mod node;
mod task;
mod work;

pub use node::{NodeKey, ScheduledNode};
pub use task::{TaskId, TaskNode, TaskRef};
pub use work::{WorkAction, WorkActionKind};
