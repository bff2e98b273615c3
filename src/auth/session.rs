//! Session records.
//!
//! A `Session` belongs to one client (one console connection). It is either
//! empty or holds the `AuthSession` created by a successful login.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::directory::Role;

/// Absolute session lifetime (8 hours).
pub const DEFAULT_SESSION_HOURS: u32 = 8;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Unique session token (UUID v4), used to correlate log lines.
    pub token: String,
    /// Role recorded in the directory.
    pub role: Role,
    /// Directory user ID.
    pub user_id: i64,
    /// Email the user logged in with.
    pub user_email: String,
    /// When the login succeeded.
    pub login_time: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(role: Role, user_id: i64, user_email: impl Into<String>, login_time: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            role,
            user_id,
            user_email: user_email.into(),
            login_time,
        }
    }

    /// Time elapsed since login.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.login_time
    }

    /// Whether the session is older than `lifetime`.
    ///
    /// A session exactly `lifetime` old is still valid.
    pub fn is_expired(&self, lifetime: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) > lifetime
    }

    /// Time left before expiry, if any.
    pub fn remaining(&self, lifetime: Duration, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = lifetime - self.age(now);
        (remaining >= Duration::zero()).then_some(remaining)
    }
}

/// Outcome of a session validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No one is logged in.
    Unauthenticated,
    /// Logged in and within the lifetime.
    Valid,
    /// The session outlived its lifetime and has been cleared.
    Expired,
}

/// Per-client session slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    auth: Option<AuthSession>,
}

impl Session {
    /// Create an unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// The authenticated session, if any.
    pub fn current(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.auth.as_ref().map(|a| a.role)
    }

    pub(crate) fn establish(&mut self, auth: AuthSession) -> &AuthSession {
        self.auth.insert(auth)
    }

    /// Clear the session, returning what was there.
    pub(crate) fn clear(&mut self) -> Option<AuthSession> {
        self.auth.take()
    }
}
