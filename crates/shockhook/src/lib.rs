//! Top-level facade crate for shockhook.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use shockhook_core::*;
}

pub mod gateway {
    pub use shockhook_gateway::*;
}
