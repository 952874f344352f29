//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics keyed by label sets and rendered by the
//! `/metrics` handler.

pub mod metrics;

pub use metrics::RelayMetrics;
