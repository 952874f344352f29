//! Token-bucket admission gate shared by every webhook.
//!
//! One token is replenished per `interval`, up to `burst` tokens. The bucket
//! is reconfigured in place whenever the policy changes: accumulated tokens
//! survive, clamped to the new burst.

use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct TokenBucket {
    /// Time to replenish one token. Zero means no refill.
    interval: Duration,
    burst: u32,
    tokens: f64,
    last: Instant,
}

impl Default for TokenBucket {
    fn default() -> Self {
        Self::closed()
    }
}

impl TokenBucket {
    /// Zero rate, zero burst: nothing is admitted until a policy is installed.
    pub fn closed() -> Self {
        Self {
            interval: Duration::ZERO,
            burst: 0,
            tokens: 0.0,
            last: Instant::now(),
        }
    }

    /// Consume one token if available. Never blocks.
    pub fn allow(&mut self) -> bool {
        self.refill(Instant::now());
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Change refill rate and bucket size, keeping what has accumulated.
    pub fn reconfigure(&mut self, interval: Duration, burst: u32) {
        // settle tokens earned under the old rate first
        self.refill(Instant::now());
        self.interval = interval;
        self.burst = burst;
        self.tokens = self.tokens.min(burst as f64);
    }

    /// Reconfigure and fill to the new burst. Used once when a store opens.
    pub fn prime(&mut self, interval: Duration, burst: u32) {
        self.reconfigure(interval, burst);
        self.tokens = burst as f64;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Whole tokens currently available (without refilling).
    pub fn available(&self) -> u32 {
        self.tokens.floor() as u32
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        if self.interval.is_zero() {
            return;
        }
        let earned = elapsed.as_secs_f64() / self.interval.as_secs_f64();
        self.tokens = (self.tokens + earned).min(self.burst as f64);
    }
}
