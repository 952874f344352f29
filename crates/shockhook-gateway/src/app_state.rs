//! Shared application state for the relay.
//!
//! Owns the policy store, the dispatcher, the admin page, and metrics. Built
//! once at startup and cloned into every handler.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use shockhook_core::error::{Result, ShockhookError};

use crate::admin::AdminPage;
use crate::config::RelayConfig;
use crate::control::{ControlClient, OpenShockClient};
use crate::dispatch::Dispatcher;
use crate::obs::RelayMetrics;
use crate::policy::{FileSlot, PolicyStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    webhook_secret: String,
    store: PolicyStore,
    dispatcher: Dispatcher,
    admin_page: AdminPage,
    metrics: RelayMetrics,
}

impl AppState {
    /// Production wiring: file-backed store under the state directory and the
    /// OpenShock client. Any failure here is fatal for the process.
    pub async fn open(cfg: &RelayConfig) -> Result<Self> {
        let dir = cfg.state_dir();
        let slot = FileSlot::open(&dir).await?;
        tracing::info!(path = %slot.path().display(), "restoring policy");
        let store = PolicyStore::open(Arc::new(slot)).await?;

        let client = OpenShockClient::new(&cfg.openshock, cfg.forward_timeout())?;
        Self::new(cfg, store, Arc::new(client))
    }

    pub fn new(cfg: &RelayConfig, store: PolicyStore, client: Arc<dyn ControlClient>) -> Result<Self> {
        let dispatcher = Dispatcher::new(
            store.clone(),
            client,
            cfg.openshock.shocker_id,
            cfg.forward_timeout(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                webhook_secret: cfg.server.webhook_secret.clone(),
                store,
                dispatcher,
                admin_page: AdminPage::new()?,
                metrics: RelayMetrics::default(),
            }),
        })
    }

    /// Compare a webhook path token with the configured secret in constant time.
    pub fn check_token(&self, token: &str) -> Result<()> {
        let secret = self.inner.webhook_secret.as_bytes();
        if bool::from(token.as_bytes().ct_eq(secret)) {
            Ok(())
        } else {
            Err(ShockhookError::AuthFailed)
        }
    }

    pub fn store(&self) -> &PolicyStore {
        &self.inner.store
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn admin_page(&self) -> &AdminPage {
        &self.inner.admin_page
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.inner.metrics
    }
}
