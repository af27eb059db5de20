//! High-level commands for babylon operations.
//!
//! These commands are the public API called by the CLI front end.

pub mod apply;
pub mod context;

pub use apply::{ApplyCommand, ApplyOptions, ApplyPlan};
pub use context::ApplyContext;
