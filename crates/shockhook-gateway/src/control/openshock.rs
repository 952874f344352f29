//! OpenShock HTTP client (`POST /2/shockers/control`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use shockhook_core::command::ControlType;
use shockhook_core::error::{Result, ShockhookError};

use super::{ControlClient, ControlRequest};
use crate::config::OpenShockSection;

const CUSTOM_NAME: &str = "shockhook";

pub struct OpenShockClient {
    client: Client,
    control_url: String,
    api_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlBody<'a> {
    shocks: Vec<ShockControl>,
    custom_name: &'a str,
}

#[derive(Debug, Serialize)]
struct ShockControl {
    id: Uuid,
    #[serde(rename = "type")]
    control_type: &'static str,
    intensity: u8,
    duration: u32,
    exclusive: bool,
}

fn wire_type(control: ControlType) -> &'static str {
    match control {
        ControlType::Shock => "Shock",
        ControlType::Vibrate => "Vibrate",
    }
}

impl OpenShockClient {
    pub fn new(cfg: &OpenShockSection, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shockhook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ShockhookError::Internal(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            control_url: format!("{}/2/shockers/control", cfg.api_server.trim_end_matches('/')),
            api_token: cfg.api_token.clone(),
        })
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }
}

#[async_trait]
impl ControlClient for OpenShockClient {
    async fn send_control(&self, req: &ControlRequest) -> Result<()> {
        let body = ControlBody {
            shocks: vec![ShockControl {
                id: req.device_id,
                control_type: wire_type(req.command.control),
                intensity: req.command.intensity,
                duration: req.command.duration.as_millis().min(u32::MAX as u128) as u32,
                exclusive: true,
            }],
            custom_name: CUSTOM_NAME,
        };

        let resp = self
            .client
            .post(&self.control_url)
            .header("OpenShockToken", &self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShockhookError::Forwarding(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ShockhookError::Forwarding(format!(
                "control API returned {status}: {detail}"
            )));
        }
        Ok(())
    }
}
