//! Isolated action execution.
//!
//! Tasks of isolatable types carry [`IsolatedParameters`]: a live value
//! graph plus the [`IsolatedAction`] implementation it feeds. Their trailing
//! action snapshots the graph while the [`ProjectLock`] is held, then
//! releases the lock for as long as the action logic runs.

mod bridge;
#[cfg(test)]
mod bridge_tests;
mod instantiator;
mod lock;
mod params;

pub use bridge::IsolatedTaskActionFactory;
pub(crate) use instantiator::InvocationError;
pub use instantiator::{Instantiator, IsolatedAction, IsolatedActionType, Services};
pub use lock::{CompletedAction, ProjectLock, ProjectLockGuard, ProjectState};
pub use params::{IsolatedParameters, IsolatedSnapshot};
