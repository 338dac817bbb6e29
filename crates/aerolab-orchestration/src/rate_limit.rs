//! Per-client token-bucket rate limiting.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Buckets kept before idle ones are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests a fresh client may make back to back.
    pub burst: u32,
    /// Time to earn back one request.
    pub refill_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 5,
            refill_interval: Duration::from_secs(12),
        }
    }
}

impl RateLimitConfig {
    /// Clamp to usable values.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.burst = self.burst.max(1);
        if self.refill_interval.is_zero() {
            self.refill_interval = Self::default().refill_interval;
        }
        self
    }

    /// Time for an empty bucket to refill completely.
    #[must_use]
    pub fn full_refill(&self) -> Duration {
        self.refill_interval
            .checked_mul(self.burst)
            .unwrap_or(Duration::MAX)
    }
}

/// The client has no tokens left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rate limit exceeded, retry after {retry_after:?}")]
pub struct RateLimited {
    /// Time until the next token is earned.
    pub retry_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

/// Token buckets keyed by client identity.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: config.normalize(),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Take one token for `client`, or report when one will be available.
    pub fn check(&self, client: &str) -> Result<(), RateLimited> {
        self.check_at(client, Instant::now())
    }

    /// [`RateLimiter::check`] as of `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), RateLimited> {
        let burst = f64::from(self.config.burst);
        let interval = self.config.refill_interval.as_secs_f64();

        let mut buckets = self.buckets.lock();
        if buckets.len() >= PRUNE_THRESHOLD && !buckets.contains_key(client) {
            self.prune_locked(&mut buckets, now);
        }

        let bucket = buckets.entry(client.to_owned()).or_insert(Bucket {
            tokens: burst,
            updated: now,
        });
        let earned = now.saturating_duration_since(bucket.updated).as_secs_f64() / interval;
        bucket.tokens = (bucket.tokens + earned).min(burst);
        bucket.updated = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            debug!(client, remaining = bucket.tokens, "Rate limit token taken");
            return Ok(());
        }

        let retry_after = Duration::try_from_secs_f64((1.0 - bucket.tokens) * interval)
            .unwrap_or(Duration::MAX);
        warn!(client, retry_after_ms = retry_after.as_millis(), "Rate limit exceeded");
        Err(RateLimited { retry_after })
    }

    /// Drop buckets that have fully refilled; returns how many were removed.
    pub fn prune_at(&self, now: Instant) -> usize {
        let mut buckets = self.buckets.lock();
        self.prune_locked(&mut buckets, now)
    }

    fn prune_locked(&self, buckets: &mut HashMap<String, Bucket>, now: Instant) -> usize {
        let before = buckets.len();
        let idle = self.config.full_refill();
        buckets.retain(|_, b| now.saturating_duration_since(b.updated) < idle);
        before - buckets.len()
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
