use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use uuid::Uuid;

use shockhook_core::error::{Result, ShockhookError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub openshock: OpenShockSection,

    #[serde(default)]
    pub state: StateSection,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            openshock: OpenShockSection::default(),
            state: StateSection::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ShockhookError::BadRequest(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.openshock.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path secret for `POST /command/{secret}`.
    #[serde(default)]
    pub webhook_secret: String,

    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            webhook_secret: String::new(),
            forward_timeout_ms: default_forward_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.webhook_secret.is_empty() {
            return Err(ShockhookError::BadRequest(
                "server.webhook_secret must not be empty".into(),
            ));
        }
        if !(100..=60000).contains(&self.forward_timeout_ms) {
            return Err(ShockhookError::BadRequest(
                "server.forward_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    /// Parse `listen`. A bare `:port` binds every IPv4 interface.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let listen = self.listen.trim();
        let addr = match listen.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => listen.to_string(),
        };
        addr.parse().map_err(|e| {
            ShockhookError::BadRequest(format!("server.listen is not a socket address: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_forward_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenShockSection {
    #[serde(default)]
    pub api_server: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub shocker_id: Uuid,
}

impl OpenShockSection {
    pub fn validate(&self) -> Result<()> {
        if self.api_server.is_empty() {
            return Err(ShockhookError::BadRequest(
                "openshock.api_server must not be empty".into(),
            ));
        }
        if self.api_token.is_empty() {
            return Err(ShockhookError::BadRequest(
                "openshock.api_token must not be empty".into(),
            ));
        }
        if self.shocker_id.is_nil() {
            return Err(ShockhookError::BadRequest(
                "openshock.shocker_id must be set".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSection {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}
