//! shockhook core: policy values, command classification, and error types.
//!
//! This crate defines the data model shared by the gateway and its tests: the
//! admin-mutable `Policy` snapshot, the inbound command record, and the
//! dispatch decision surface. No transport or runtime dependencies.
//!
//! `unwrap`, `expect` and `panic!` are denied outside tests; fallible paths
//! return `ShockhookError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod command;
pub mod error;
pub mod policy;

/// Shared result type.
pub use error::{Result, ShockhookError};
