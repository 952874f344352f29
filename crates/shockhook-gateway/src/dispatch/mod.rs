//! Dispatcher module exports.
//!
//! Re-exports the decision pipeline so transport and tests can depend on this
//! module directly.

pub mod dispatcher;

pub use dispatcher::{evaluate, Dispatcher};
