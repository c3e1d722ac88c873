//! Fixed-window rate limiting keyed by client identity and policy.
//!
//! The limiter owns the only shared mutable state in the request path: a
//! concurrent map of counter entries. A `RateLimiter` is constructed once at
//! startup and cloned into the middleware; every clone shares the same store.

use crate::error::ConfigError;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

/// Source of the current time for window bookkeeping
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Lets tests step across window boundaries without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        let by = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Longest window a policy may use
pub const MAX_WINDOW: Duration = Duration::from_secs(366 * 86_400);

/// A named limit applied to one route group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    id: String,
    limit: u64,
    window: Duration,
    span: TimeDelta,
}

impl Policy {
    /// Build a policy, rejecting a zero limit, an empty window or one longer
    /// than [`MAX_WINDOW`]
    pub fn new(id: impl Into<String>, limit: u64, window: Duration) -> Result<Self, ConfigError> {
        let id = id.into();
        if limit == 0 {
            return Err(ConfigError::NonPositiveLimit { policy: id });
        }
        if window.is_zero() {
            return Err(ConfigError::NonPositiveWindow { policy: id });
        }
        if window > MAX_WINDOW {
            return Err(ConfigError::WindowOutOfRange { policy: id });
        }
        let span = TimeDelta::from_std(window)
            .map_err(|_| ConfigError::WindowOutOfRange { policy: id.clone() })?;

        Ok(Self {
            id,
            limit,
            window,
            span,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Human readable form used in rejection messages, e.g. "3 per 1 minute"
    pub fn describe(&self) -> String {
        format!("{} per {}", self.limit, describe_window(self.window))
    }
}

/// Outcome of a single rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        remaining: u64,
        reset_at: DateTime<Utc>,
    },
    Rejected {
        retry_after: Duration,
        limit: u64,
        window: Duration,
        reset_at: DateTime<Utc>,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    /// Requests left in the current window; zero once rejected
    pub fn remaining(&self) -> u64 {
        match self {
            Decision::Allowed { remaining, .. } => *remaining,
            Decision::Rejected { .. } => 0,
        }
    }

    pub fn reset_at(&self) -> DateTime<Utc> {
        match self {
            Decision::Allowed { reset_at, .. } | Decision::Rejected { reset_at, .. } => *reset_at,
        }
    }

    /// Body text for a 429 response, `None` when the request was allowed
    pub fn rejection_message(&self) -> Option<String> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Rejected { limit, window, .. } => Some(format!(
                "Rate limit exceeded: {} per {}",
                limit,
                describe_window(*window)
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CounterKey {
    identity: String,
    policy: String,
}

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    window_start: DateTime<Utc>,
    span: TimeDelta,
}

impl CounterEntry {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.window_start) >= self.span
    }
}

/// In-memory fixed-window rate limiter
///
/// Each `(identity, policy)` pair gets its own counter. The read, compare and
/// increment for a key happen while holding that key's shard lock, so two
/// concurrent requests can never both take the last slot.
#[derive(Clone)]
pub struct RateLimiter {
    counters: Arc<DashMap<CounterKey, CounterEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Create a limiter backed by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Record a request from `identity` against `policy` and decide whether it may proceed
    pub fn check(&self, identity: &str, policy: &Policy) -> Decision {
        let now = self.clock.now();
        let key = CounterKey {
            identity: identity.to_string(),
            policy: policy.id.clone(),
        };

        let mut entry = self.counters.entry(key).or_insert(CounterEntry {
            count: 0,
            window_start: now,
            span: policy.span,
        });

        entry.span = policy.span;
        if entry.expired(now) {
            entry.count = 0;
            entry.window_start = now;
        }

        let reset_at = entry
            .window_start
            .checked_add_signed(policy.span)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        if entry.count < policy.limit {
            entry.count += 1;
            Decision::Allowed {
                remaining: policy.limit - entry.count,
                reset_at,
            }
        } else {
            Decision::Rejected {
                retry_after: (reset_at - now).to_std().unwrap_or(Duration::ZERO),
                limit: policy.limit,
                window: policy.window,
                reset_at,
            }
        }
    }

    /// Drop counters whose window has already elapsed
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters.retain(|_, entry| !entry.expired(now));
        before.saturating_sub(self.counters.len())
    }

    /// Number of counters currently held
    pub fn tracked(&self) -> usize {
        self.counters.len()
    }
}

/// Render a window as "1 minute", "2 hours", "90 seconds" and so on
pub fn describe_window(window: Duration) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "day"), (3_600, "hour"), (60, "minute"), (1, "second")];

    let secs = window.as_secs();
    if secs == 0 || window.subsec_nanos() != 0 {
        return format!("{} milliseconds", window.as_millis());
    }

    for (size, unit) in UNITS {
        if secs % size == 0 {
            let n = secs / size;
            let plural = if n == 1 { "" } else { "s" };
            return format!("{n} {unit}{plural}");
        }
    }

    format!("{secs} seconds")
}

/// Periodically remove expired counters
///
/// Must be called from within a Tokio runtime. The gauge callback receives the
/// number of counters still tracked after each pass.
pub fn spawn_sweeper<F>(
    limiter: RateLimiter,
    every: Duration,
    on_sweep: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(usize) + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = limiter.sweep();
            let tracked = limiter.tracked();
            tracing::debug!(removed, tracked, "Swept expired rate limit counters");
            on_sweep(tracked);
        }
    })
}
