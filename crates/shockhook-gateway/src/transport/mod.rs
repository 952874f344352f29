//! HTTP transport (webhook and admin handlers).
//!
//! Handlers decode requests, hand them to the dispatcher or the admin
//! mutator, and translate every error into a status-bearing response.

pub mod admin;
pub mod error;
pub mod webhook;

pub use error::ApiError;
