use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use shockhook_core::command::{ControlCommand, ControlType, DispatchDecision, InboundCommand};
use shockhook_core::policy::Policy;

use crate::control::{ControlClient, ControlRequest};
use crate::policy::PolicyStore;

/// Evaluate one command against a policy snapshot. First matching rule wins:
/// pause, room allow-list, command classification, action flag, limiter.
///
/// `allow` is only called once every other rule has passed.
pub fn evaluate(
    policy: &Policy,
    cmd: &InboundCommand,
    allow: impl FnOnce() -> bool,
) -> DispatchDecision {
    if policy.paused {
        return DispatchDecision::DenySilent;
    }

    if !policy.admits_room(cmd.room_id.as_deref()) {
        return DispatchDecision::DenySilent;
    }

    let control = match ControlType::classify(&cmd.command) {
        Some(c) => c,
        None => return DispatchDecision::DenySilent,
    };

    let enabled = match control {
        ControlType::Shock => policy.allow_shock,
        ControlType::Vibrate => policy.allow_vibrate,
    };
    if !enabled {
        return DispatchDecision::DenySilent;
    }

    if !allow() {
        return DispatchDecision::rate_limited();
    }

    DispatchDecision::Forward(ControlCommand {
        control,
        intensity: policy.intensity,
        duration: policy.duration,
    })
}

/// Maps inbound commands to decisions and forwards the permitted ones.
pub struct Dispatcher {
    store: PolicyStore,
    client: Arc<dyn ControlClient>,
    device_id: Uuid,
    forward_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        store: PolicyStore,
        client: Arc<dyn ControlClient>,
        device_id: Uuid,
        forward_timeout: Duration,
    ) -> Self {
        Self {
            store,
            client,
            device_id,
            forward_timeout,
        }
    }

    /// Dispatch against the current snapshot. The decision and the token it
    /// spends are taken under the store lock together.
    pub async fn dispatch(&self, cmd: &InboundCommand) -> DispatchDecision {
        let decision = self
            .store
            .admit(|policy, limiter| evaluate(policy, cmd, || limiter.allow()));
        self.settle(cmd, decision).await
    }

    /// Dispatch against an explicit snapshot, using the store's limiter.
    pub async fn dispatch_with(&self, policy: &Policy, cmd: &InboundCommand) -> DispatchDecision {
        let decision = evaluate(policy, cmd, || self.store.allow());
        self.settle(cmd, decision).await
    }

    async fn settle(&self, cmd: &InboundCommand, decision: DispatchDecision) -> DispatchDecision {
        match decision {
            DispatchDecision::Forward(command) => self.forward(cmd, command).await,
            other => other,
        }
    }

    async fn forward(&self, cmd: &InboundCommand, command: ControlCommand) -> DispatchDecision {
        tracing::info!(
            author_user = %cmd.author_user,
            target_user = %cmd.target_user,
            room_id = ?cmd.room_id,
            control = %command.control,
            "sending control request"
        );

        let req = ControlRequest {
            device_id: self.device_id,
            command,
        };
        match tokio::time::timeout(self.forward_timeout, self.client.send_control(&req)).await {
            Ok(Ok(())) => DispatchDecision::Forward(command),
            Ok(Err(e)) => {
                tracing::error!(err = %e, "failed to send control request");
                DispatchDecision::forward_failed()
            }
            Err(_) => {
                tracing::error!(timeout = ?self.forward_timeout, "control request timed out");
                DispatchDecision::forward_failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shockhook_core::command::{FORWARD_FAILED_MESSAGE, RATE_LIMITED_MESSAGE};
    use shockhook_core::error::{Result, ShockhookError};

    use super::*;
    use crate::policy::MemorySlot;

    fn open_policy() -> Policy {
        Policy {
            paused: false,
            intensity: 25,
            duration: Duration::from_millis(800),
            rate_interval: Duration::from_secs(2),
            rate_burst: 2,
            allow_shock: true,
            allow_vibrate: true,
            allowed_rooms: None,
        }
    }

    fn cmd(text: &str, room: Option<&str>) -> InboundCommand {
        InboundCommand {
            author_user: "@alice:example.org".into(),
            target_user: "@bob:example.org".into(),
            room_id: room.map(str::to_owned),
            command: text.into(),
        }
    }

    /// Runs `evaluate` and reports whether the limiter was consulted.
    fn eval(policy: &Policy, c: &InboundCommand, token: bool) -> (DispatchDecision, bool) {
        let asked = Cell::new(false);
        let d = evaluate(policy, c, || {
            asked.set(true);
            token
        });
        (d, asked.get())
    }

    #[test]
    fn paused_denies_everything_without_touching_limiter() {
        let p = Policy {
            paused: true,
            ..open_policy()
        };
        for text in ["shock", "zap", "vibrate", "hello"] {
            for room in [None, Some("!a:x")] {
                assert_eq!(
                    eval(&p, &cmd(text, room), true),
                    (DispatchDecision::DenySilent, false)
                );
            }
        }
    }

    #[test]
    fn room_filter_runs_before_classification() {
        let p = Policy {
            allowed_rooms: Some(["!ok:x".to_string()].into()),
            ..open_policy()
        };
        assert_eq!(
            eval(&p, &cmd("shock", Some("!other:x")), true),
            (DispatchDecision::DenySilent, false)
        );
        assert_eq!(
            eval(&p, &cmd("shock", None), true),
            (DispatchDecision::DenySilent, false)
        );
        assert!(matches!(
            eval(&p, &cmd("shock", Some("!ok:x")), true).0,
            DispatchDecision::Forward(_)
        ));

        let closed = Policy {
            allowed_rooms: Some(BTreeSet::new()),
            ..open_policy()
        };
        assert_eq!(
            eval(&closed, &cmd("zap", Some("!ok:x")), true),
            (DispatchDecision::DenySilent, false)
        );
    }

    #[test]
    fn classification_picks_control_type() {
        let p = open_policy();
        let forwarded = |text: &str| match eval(&p, &cmd(text, None), true).0 {
            DispatchDecision::Forward(c) => Some(c.control),
            _ => None,
        };
        assert_eq!(forwarded("shock-now"), Some(ControlType::Shock));
        assert_eq!(forwarded("zapzap"), Some(ControlType::Shock));
        assert_eq!(forwarded("vibrate"), Some(ControlType::Vibrate));
        assert_eq!(forwarded("ZAP"), None);
        assert_eq!(forwarded("please shock"), None);
    }

    #[test]
    fn disabled_action_denies_silently() {
        let p = Policy {
            allow_shock: false,
            ..open_policy()
        };
        assert_eq!(
            eval(&p, &cmd("zap", None), true),
            (DispatchDecision::DenySilent, false)
        );
        assert!(matches!(
            eval(&p, &cmd("vibrate", None), true).0,
            DispatchDecision::Forward(_)
        ));

        let p = Policy {
            allow_vibrate: false,
            ..open_policy()
        };
        assert_eq!(
            eval(&p, &cmd("vibrate", None), true),
            (DispatchDecision::DenySilent, false)
        );
    }

    #[test]
    fn limiter_is_last_and_carries_message() {
        let p = open_policy();
        let (d, asked) = eval(&p, &cmd("shock", None), false);
        assert!(asked);
        assert_eq!(d.message(), Some(RATE_LIMITED_MESSAGE));
        assert_eq!(
            eval(&p, &cmd("shock", None), true).0,
            DispatchDecision::Forward(ControlCommand {
                control: ControlType::Shock,
                intensity: 25,
                duration: Duration::from_millis(800),
            })
        );
    }

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<ControlRequest>>,
    }

    #[async_trait]
    impl ControlClient for Recording {
        async fn send_control(&self, req: &ControlRequest) -> Result<()> {
            self.sent.lock().unwrap().push(*req);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ControlClient for Failing {
        async fn send_control(&self, _: &ControlRequest) -> Result<()> {
            Err(ShockhookError::Forwarding("503".into()))
        }
    }

    struct Hanging;

    #[async_trait]
    impl ControlClient for Hanging {
        async fn send_control(&self, _: &ControlRequest) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    const DEVICE: Uuid = Uuid::from_u128(0xfeed);

    async fn dispatcher(policy: Policy, client: Arc<dyn ControlClient>) -> Dispatcher {
        let store = PolicyStore::open(Arc::new(MemorySlot::with_policy(policy)))
            .await
            .unwrap();
        Dispatcher::new(store, client, DEVICE, Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_two_then_limited_then_refilled() {
        let client = Arc::new(Recording::default());
        let d = dispatcher(open_policy(), client.clone()).await;

        assert!(matches!(d.dispatch(&cmd("shock", None)).await, DispatchDecision::Forward(_)));
        assert!(matches!(d.dispatch(&cmd("shock", None)).await, DispatchDecision::Forward(_)));
        assert_eq!(
            d.dispatch(&cmd("shock", None)).await,
            DispatchDecision::rate_limited()
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(matches!(d.dispatch(&cmd("vibrate", None)).await, DispatchDecision::Forward(_)));

        let sent = client.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|r| r.device_id == DEVICE));
        assert_eq!(sent[2].command.control, ControlType::Vibrate);
        assert_eq!(sent[2].command.intensity, 25);
    }

    #[tokio::test]
    async fn denied_commands_are_not_forwarded() {
        let client = Arc::new(Recording::default());
        let d = dispatcher(Policy::default(), client.clone()).await;
        assert_eq!(d.dispatch(&cmd("shock", None)).await, DispatchDecision::DenySilent);
        assert!(client.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn client_error_is_reported_not_retried() {
        let d = dispatcher(open_policy(), Arc::new(Failing)).await;
        let out = d.dispatch(&cmd("zap", None)).await;
        assert_eq!(out.message(), Some(FORWARD_FAILED_MESSAGE));
        // the failed attempt still spent its token
        assert_eq!(d.store.limiter_state().2, 1);
        assert_eq!(*d.store.load(), open_policy());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_client_times_out() {
        let d = dispatcher(open_policy(), Arc::new(Hanging)).await;
        let out = d.dispatch(&cmd("shock", None)).await;
        assert_eq!(out, DispatchDecision::forward_failed());
    }

    #[tokio::test]
    async fn dispatch_with_uses_given_snapshot() {
        let client = Arc::new(Recording::default());
        let d = dispatcher(Policy::default(), client.clone()).await;
        let out = d.dispatch_with(&open_policy(), &cmd("vibrate", None)).await;
        assert!(matches!(out, DispatchDecision::Forward(_)));
        assert_eq!(client.sent.lock().unwrap().len(), 1);
    }
}
