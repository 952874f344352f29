//! Policy layer (live snapshot, admission limiter, durable slot).
//!
//! `PolicyStore` is the only owner of the mutable policy state; every other
//! layer reads snapshots from it and asks it for admission tokens.

pub mod limiter;
pub mod slot;
pub mod store;

pub use limiter::TokenBucket;
pub use slot::{FileSlot, MemorySlot, PolicySlot};
pub use store::PolicyStore;
