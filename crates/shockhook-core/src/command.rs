//! Inbound webhook commands and the decisions made about them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const RATE_LIMITED_MESSAGE: &str = "ow :< don't hurt it too much...";
pub const FORWARD_FAILED_MESSAGE: &str = "something went wrong :<";

/// Category of physical action requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    Shock,
    Vibrate,
}

impl ControlType {
    /// Classify command text by case-sensitive prefix.
    ///
    /// `shock`/`zap` win over `vibrate`; anything else is unrecognized.
    pub fn classify(command: &str) -> Option<Self> {
        if command.starts_with("shock") || command.starts_with("zap") {
            Some(ControlType::Shock)
        } else if command.starts_with("vibrate") {
            Some(ControlType::Vibrate)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlType::Shock => "shock",
            ControlType::Vibrate => "vibrate",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Webhook body as posted by the chat integration.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundCommand {
    pub author_user: String,
    pub target_user: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub command: String,
}

/// Webhook reply. `message` is null unless the caller should be told something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub message: Option<String>,
}

/// Parameters of a permitted control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    pub control: ControlType,
    pub intensity: u8,
    pub duration: Duration,
}

/// Outcome of evaluating one inbound command against the current policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchDecision {
    /// Forwarded to the control API.
    Forward(ControlCommand),
    /// Denied without telling the caller.
    DenySilent,
    /// Admission limiter had no token left.
    DenyRateLimited { message: &'static str },
    /// Permitted, but the control API call failed or timed out.
    ForwardFailed { message: &'static str },
}

impl DispatchDecision {
    pub fn rate_limited() -> Self {
        DispatchDecision::DenyRateLimited {
            message: RATE_LIMITED_MESSAGE,
        }
    }

    pub fn forward_failed() -> Self {
        DispatchDecision::ForwardFailed {
            message: FORWARD_FAILED_MESSAGE,
        }
    }

    /// Message shown to the webhook caller, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DispatchDecision::Forward(_) | DispatchDecision::DenySilent => None,
            DispatchDecision::DenyRateLimited { message }
            | DispatchDecision::ForwardFailed { message } => Some(*message),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchDecision::Forward(_) => "forward",
            DispatchDecision::DenySilent => "deny_silent",
            DispatchDecision::DenyRateLimited { .. } => "rate_limited",
            DispatchDecision::ForwardFailed { .. } => "forward_failed",
        }
    }

    pub fn into_response(self) -> WebhookResponse {
        WebhookResponse {
            message: self.message().map(str::to_owned),
        }
    }
}
