//! Shared error type across shockhook crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed request body or config.
    BadRequest,
    /// Webhook token mismatch.
    AuthFailed,
    /// Admin input rejected.
    Validation,
    /// Durable write failed.
    Persistence,
    /// Outbound control request failed.
    Forwarding,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::Validation => "VALIDATION",
            ClientCode::Persistence => "PERSISTENCE",
            ClientCode::Forwarding => "FORWARDING",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ShockhookError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum ShockhookError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid token")]
    AuthFailed,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("cannot persist policy: {0}")]
    Persistence(String),
    #[error("control request failed: {0}")]
    Forwarding(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ShockhookError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ShockhookError::BadRequest(_) => ClientCode::BadRequest,
            ShockhookError::AuthFailed => ClientCode::AuthFailed,
            ShockhookError::Validation(_) => ClientCode::Validation,
            ShockhookError::Persistence(_) => ClientCode::Persistence,
            ShockhookError::Forwarding(_) => ClientCode::Forwarding,
            ShockhookError::Internal(_) => ClientCode::Internal,
        }
    }
}
