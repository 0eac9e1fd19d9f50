//! Observability utilities.

mod tracing;

pub use tracing::{SpanTimer, TaskSpanAttributes};
