//! Observability infrastructure.
//!
//! Structured logging via `tracing` and a JSONL event stream for
//! machine consumption of exercise milestones.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging, verbosity_to_directive};
pub use metrics::describe_metrics;
