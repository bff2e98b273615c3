//! Login attempt throttling.
//!
//! Failed attempts are counted per throttle key. Once the count reaches the
//! limit, verification is refused until the cooldown measured from the last
//! failed attempt has elapsed. Resets are lazy: nothing runs in the
//! background, the state is re-evaluated on every check.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Maximum failed login attempts before the form locks.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Cooldown after the last failed attempt (15 minutes).
pub const LOCKOUT_MINUTES: u32 = 15;

/// Key shared by every attempt when the scope is global.
const GLOBAL_KEY: &str = "*";

/// Minimum interval between two sweeps of stale counters.
const SWEEP_INTERVAL_SECS: i64 = 60;

/// What a throttle counter is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottleScope {
    /// One counter for every login attempt on the surface.
    #[default]
    Global,
    /// One counter per (case-insensitive) email address.
    PerAccount,
}

impl ThrottleScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleScope::Global => "global",
            ThrottleScope::PerAccount => "account",
        }
    }
}

impl fmt::Display for ThrottleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThrottleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(ThrottleScope::Global),
            "account" | "per-account" => Ok(ThrottleScope::PerAccount),
            _ => Err(format!("unknown throttle scope: {s}")),
        }
    }
}

/// Failed-attempt bookkeeping for one throttle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleState {
    /// Consecutive failed attempts inside the current window.
    pub attempt_count: u32,
    /// Time of the most recent failed attempt.
    pub last_attempt_time: Option<DateTime<Utc>>,
}

/// Result of a throttle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitResult {
    /// Verification may proceed.
    Allowed,
    /// Locked; whole minutes left as reported to the user.
    Locked { minutes: i64 },
}

/// Login attempt limiter.
#[derive(Debug)]
pub struct LoginLimiter {
    scope: ThrottleScope,
    max_attempts: u32,
    lockout_minutes: u32,
    states: HashMap<String, ThrottleState>,
    last_sweep: Option<DateTime<Utc>>,
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::new(ThrottleScope::Global)
    }
}

impl LoginLimiter {
    /// Create a limiter with the default limit and cooldown.
    pub fn new(scope: ThrottleScope) -> Self {
        Self::with_config(scope, MAX_LOGIN_ATTEMPTS, LOCKOUT_MINUTES)
    }

    /// Create a limiter with a custom limit and cooldown.
    pub fn with_config(scope: ThrottleScope, max_attempts: u32, lockout_minutes: u32) -> Self {
        Self {
            scope,
            max_attempts,
            lockout_minutes,
            states: HashMap::new(),
            last_sweep: None,
        }
    }

    /// Number of keys with a live counter.
    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    fn lockout(&self) -> Duration {
        Duration::minutes(i64::from(self.lockout_minutes))
    }

    fn key(&self, email: &str) -> String {
        match self.scope {
            ThrottleScope::Global => GLOBAL_KEY.to_string(),
            ThrottleScope::PerAccount => email.trim().to_lowercase(),
        }
    }

    /// Check whether a verification attempt for `email` may proceed at `now`.
    ///
    /// A counter whose last failure is at least one cooldown old is dropped
    /// here, before the limit is compared. Stale counters of other keys are
    /// swept at most once a minute.
    pub fn check(&mut self, email: &str, now: DateTime<Utc>) -> LimitResult {
        self.sweep(now);

        let key = self.key(email);
        let lockout = self.lockout();
        let lockout_minutes = i64::from(self.lockout_minutes);
        let max_attempts = self.max_attempts;

        let Some(state) = self.states.get(&key).copied() else {
            return LimitResult::Allowed;
        };

        let Some(last) = state.last_attempt_time else {
            return LimitResult::Allowed;
        };

        let elapsed = (now - last).max(Duration::zero());
        if elapsed >= lockout {
            debug!(key = %key, "Throttle window elapsed, resetting attempt count");
            self.states.remove(&key);
            return LimitResult::Allowed;
        }

        if state.attempt_count >= max_attempts {
            return LimitResult::Locked {
                minutes: lockout_minutes - elapsed.num_minutes(),
            };
        }

        LimitResult::Allowed
    }

    /// Record a failed attempt and return the attempts remaining.
    pub fn record_failure(&mut self, email: &str, now: DateTime<Utc>) -> u32 {
        let key = self.key(email);
        let state = self.states.entry(key.clone()).or_default();
        state.attempt_count = state.attempt_count.saturating_add(1);
        state.last_attempt_time = Some(now);

        debug!(
            key = %key,
            attempt_count = state.attempt_count,
            "Recorded failed login attempt"
        );

        self.max_attempts.saturating_sub(state.attempt_count)
    }

    /// Reset the counter for `email` (call on successful login).
    pub fn clear(&mut self, email: &str) {
        let key = self.key(email);
        self.states.remove(&key);
    }

    /// Snapshot of the throttle state that applies to `email`.
    pub fn state(&self, email: &str) -> ThrottleState {
        self.states
            .get(&self.key(email))
            .copied()
            .unwrap_or_default()
    }

    /// Drop counters whose cooldown has elapsed.
    pub fn cleanup(&mut self, now: DateTime<Utc>) -> usize {
        let lockout = self.lockout();
        let before = self.states.len();
        self.states.retain(|_, state| match state.last_attempt_time {
            Some(last) => now - last < lockout,
            None => false,
        });
        before - self.states.len()
    }

    fn sweep(&mut self, now: DateTime<Utc>) {
        let due = self
            .last_sweep
            .map_or(true, |last| now - last >= Duration::seconds(SWEEP_INTERVAL_SECS));
        if !due {
            return;
        }
        self.last_sweep = Some(now);

        let removed = self.cleanup(now);
        if removed > 0 {
            debug!(removed, remaining = self.tracked(), "Dropped stale throttle counters");
        }
    }
}
