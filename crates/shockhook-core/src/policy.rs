//! The admin-mutable relay policy.
//!
//! A `Policy` is an immutable snapshot: readers hold it behind an `Arc` and
//! writers replace it wholesale. Bounds are enforced when an admin builds a
//! new snapshot, never at dispatch time.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const MIN_INTENSITY: u8 = 0;
pub const MAX_INTENSITY: u8 = 100;
pub const MIN_DURATION: Duration = Duration::from_millis(300);
pub const MAX_DURATION: Duration = Duration::from_secs(30);

/// Full set of rules governing whether and how a command is forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Global kill switch. Dispatch always denies while set.
    pub paused: bool,
    pub intensity: u8,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    /// Time needed to replenish one limiter token.
    #[serde(rename = "rate_interval_ms", with = "duration_ms")]
    pub rate_interval: Duration,
    pub rate_burst: u32,
    pub allow_shock: bool,
    pub allow_vibrate: bool,
    /// `None` admits every room; `Some(empty)` admits none.
    pub allowed_rooms: Option<BTreeSet<String>>,
}

impl Default for Policy {
    /// Inert state used when nothing has been persisted yet.
    fn default() -> Self {
        Self {
            paused: true,
            intensity: 0,
            duration: MIN_DURATION,
            rate_interval: Duration::from_secs(2),
            rate_burst: 2,
            allow_shock: false,
            allow_vibrate: false,
            allowed_rooms: Some(BTreeSet::new()),
        }
    }
}

impl Policy {
    /// Whether a command from `room` passes the room allow-list.
    ///
    /// A command without a room only passes the wildcard.
    pub fn admits_room(&self, room: Option<&str>) -> bool {
        match &self.allowed_rooms {
            None => true,
            Some(rooms) => room.is_some_and(|r| rooms.contains(r)),
        }
    }

    /// Returns a copy with only the pause flag changed.
    pub fn with_paused(&self, paused: bool) -> Self {
        Self {
            paused,
            ..self.clone()
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
