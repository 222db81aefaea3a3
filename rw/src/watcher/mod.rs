//! Change monitoring
//!
//! The [`Monitor`] owns the poll loop: fingerprint the target, compare to
//! the last known value, and publish + notify when it changes.

mod monitor;

pub use monitor::{CycleOutcome, Monitor};
