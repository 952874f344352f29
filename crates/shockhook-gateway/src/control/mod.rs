//! Outbound device-control API.
//!
//! The dispatcher talks to the device vendor through `ControlClient` only, so
//! tests can swap in a recording or failing client.

pub mod openshock;

use async_trait::async_trait;
use uuid::Uuid;

use shockhook_core::command::ControlCommand;
use shockhook_core::error::Result;

pub use openshock::OpenShockClient;

/// One control request for one device. Single attempt, no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub device_id: Uuid,
    pub command: ControlCommand,
}

#[async_trait]
pub trait ControlClient: Send + Sync {
    async fn send_control(&self, req: &ControlRequest) -> Result<()>;
}
