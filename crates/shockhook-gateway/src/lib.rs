//! shockhook gateway library entry.
//!
//! This crate wires the policy store, dispatcher, admin surface, and control
//! client into the relay's HTTP service. It is intended to be consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod admin;
pub mod app_state;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod transport;
