//! Live policy snapshot paired with its admission limiter.
//!
//! Readers take a short lock to clone an `Arc<Policy>`; the limiter sits
//! behind the same lock so a snapshot swap and the matching limiter
//! reconfiguration are observed together. Writers are serialized by a
//! separate async gate held across the durable write, and each write runs on
//! its own task so a cancelled caller cannot split disk from memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shockhook_core::error::{Result, ShockhookError};
use shockhook_core::policy::Policy;

use super::limiter::TokenBucket;
use super::slot::PolicySlot;

#[derive(Clone)]
pub struct PolicyStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    shared: Mutex<Shared>,
    writer: tokio::sync::Mutex<()>,
    slot: Arc<dyn PolicySlot>,
}

struct Shared {
    policy: Arc<Policy>,
    limiter: TokenBucket,
}

impl PolicyStore {
    /// Restore the last persisted policy, or install and persist the default.
    pub async fn open(slot: Arc<dyn PolicySlot>) -> Result<Self> {
        let policy = match slot.load().await? {
            Some(p) => p,
            None => {
                let p = Policy::default();
                slot.save(&p).await?;
                tracing::info!("no persisted policy, installed default");
                p
            }
        };

        let mut limiter = TokenBucket::closed();
        limiter.prime(policy.rate_interval, policy.rate_burst);

        Ok(Self {
            inner: Arc::new(StoreInner {
                shared: Mutex::new(Shared {
                    policy: Arc::new(policy),
                    limiter,
                }),
                writer: tokio::sync::Mutex::new(()),
                slot,
            }),
        })
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Policy> {
        Arc::clone(&self.inner.shared().policy)
    }

    /// Take one admission token from the limiter paired with the current policy.
    pub fn allow(&self) -> bool {
        // Poisoned lock means a logic bug; deny rather than panic.
        match self.inner.shared.lock() {
            Ok(mut g) => g.limiter.allow(),
            Err(_) => false,
        }
    }

    /// Run `f` against the current snapshot and its paired limiter under one
    /// lock, so a concurrent write cannot land between the two.
    pub fn admit<R>(&self, f: impl FnOnce(&Policy, &mut TokenBucket) -> R) -> R {
        let mut g = self.inner.shared();
        let Shared { policy, limiter } = &mut *g;
        f(&**policy, limiter)
    }

    /// Persist `policy` and make it current. On error nothing changes.
    pub async fn replace(&self, policy: Policy) -> Result<Arc<Policy>> {
        self.modify(move |_| Ok(policy)).await
    }

    /// Build the next policy from the committed one, persist it, then swap.
    ///
    /// `f` runs inside the writer section, so it always sees the result of
    /// the previous write.
    pub async fn modify<F>(&self, f: F) -> Result<Arc<Policy>>
    where
        F: FnOnce(&Policy) -> Result<Policy> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.commit(f).await })
            .await
            .map_err(|e| ShockhookError::Internal(format!("policy write task failed: {e}")))?
    }

    /// (interval, burst, whole tokens) of the paired limiter.
    pub fn limiter_state(&self) -> (std::time::Duration, u32, u32) {
        let g = self.inner.shared();
        (g.limiter.interval(), g.limiter.burst(), g.limiter.available())
    }
}

impl StoreInner {
    fn shared(&self) -> MutexGuard<'_, Shared> {
        // The guarded pair is only ever assigned whole, so a poisoned value is still consistent.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn commit<F>(&self, f: F) -> Result<Arc<Policy>>
    where
        F: FnOnce(&Policy) -> Result<Policy>,
    {
        let _gate = self.writer.lock().await;

        let current = Arc::clone(&self.shared().policy);
        let next = f(current.as_ref())?;

        if let Err(e) = self.slot.save(&next).await {
            tracing::error!(err = %e, "policy not applied, durable write failed");
            return Err(e);
        }

        let next = Arc::new(next);
        {
            let mut g = self.shared();
            g.limiter.reconfigure(next.rate_interval, next.rate_burst);
            g.policy = Arc::clone(&next);
        }
        tracing::info!(policy = ?next, "applied new policy");
        Ok(next)
    }
}
