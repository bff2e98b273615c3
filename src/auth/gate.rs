//! The login gate.
//!
//! `SessionGate` verifies credentials against a `UserDirectory`, applies
//! login throttling and owns the session lifecycle. Callers pass their own
//! `Session` into every operation; the gate keeps only the throttle state,
//! which is shared by all clients and guarded by a mutex.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::password::verify_password;
use super::session::{AuthSession, Session, SessionStatus, DEFAULT_SESSION_HOURS};
use super::throttle::{
    LimitResult, LoginLimiter, ThrottleScope, ThrottleState, LOCKOUT_MINUTES, MAX_LOGIN_ATTEMPTS,
};
use crate::config::AuthConfig;
use crate::directory::{CredentialRecord, Role, UserDirectory};
use crate::Result;

/// Errors returned by a login attempt. The messages are shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Too many failed attempts; retry after the cooldown.
    #[error("Too many failed attempts. Please try again in {minutes} minutes")]
    Throttled { minutes: i64 },

    /// Unknown email, wrong password or wrong role. Deliberately
    /// indistinguishable.
    #[error("Invalid credentials or unauthorized role access. Attempts remaining: {remaining}")]
    InvalidCredentials { remaining: u32 },

    /// The account exists but is disabled.
    #[error("Account is inactive. Please contact administrator.")]
    AccountInactive,

    /// Email or password left empty.
    #[error("Please enter both email and password")]
    MissingCredentials,

    /// Claimed role is not one of the portal roles.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Longest claimed role echoed back in `UnknownRole`.
const MAX_ECHOED_ROLE_CHARS: usize = 32;

fn echoed_role(claimed_role: &str) -> String {
    claimed_role.chars().take(MAX_ECHOED_ROLE_CHARS).collect()
}

/// Outcome of checking credentials against the directory.
enum Verdict {
    UnknownEmail,
    WrongPassword,
    RoleMismatch,
    Accepted(CredentialRecord),
}

/// Gate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSettings {
    pub max_attempts: u32,
    pub lockout_minutes: u32,
    pub session_hours: u32,
    pub scope: ThrottleScope,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            lockout_minutes: LOCKOUT_MINUTES,
            session_hours: DEFAULT_SESSION_HOURS,
            scope: ThrottleScope::Global,
        }
    }
}

impl GateSettings {
    /// Build settings from the `[auth]` config section.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            max_attempts: config.max_login_attempts,
            lockout_minutes: config.lockout_minutes,
            session_hours: config.session_hours,
            scope: config.scope()?,
        })
    }

    pub fn session_lifetime(&self) -> Duration {
        Duration::hours(i64::from(self.session_hours))
    }
}

/// Login gate over a user directory.
#[derive(Debug)]
pub struct SessionGate<D> {
    directory: D,
    settings: GateSettings,
    limiter: Mutex<LoginLimiter>,
}

impl<D: UserDirectory> SessionGate<D> {
    /// Create a gate with default settings.
    pub fn new(directory: D) -> Self {
        Self::with_settings(directory, GateSettings::default())
    }

    pub fn with_settings(directory: D, settings: GateSettings) -> Self {
        Self {
            directory,
            settings,
            limiter: Mutex::new(LoginLimiter::with_config(
                settings.scope,
                settings.max_attempts,
                settings.lockout_minutes,
            )),
        }
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    fn limiter(&self) -> MutexGuard<'_, LoginLimiter> {
        // The limiter holds plain counters, so a poisoned lock is still usable.
        self.limiter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Throttle state that applies to `email`.
    pub fn throttle_state(&self, email: &str) -> ThrottleState {
        self.limiter().state(email)
    }

    /// Attempt a login at the current time.
    pub fn attempt_login<'s>(
        &self,
        session: &'s mut Session,
        email: &str,
        password: &str,
        claimed_role: &str,
    ) -> std::result::Result<&'s AuthSession, LoginError> {
        self.attempt_login_at(session, email, password, claimed_role, Utc::now())
    }

    /// Attempt a login at `now`.
    ///
    /// On success `session` holds the new `AuthSession` and the throttle
    /// counter is reset. On failure `session` is left untouched.
    pub fn attempt_login_at<'s>(
        &self,
        session: &'s mut Session,
        email: &str,
        password: &str,
        claimed_role: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<&'s AuthSession, LoginError> {
        if email.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }
        let claimed_role: Role = claimed_role
            .parse()
            .map_err(|_| LoginError::UnknownRole(echoed_role(claimed_role)))?;

        self.check_throttle(email, now)?;

        // Verification runs unlocked so a slow password hash does not stall
        // other clients.
        let verdict = match self.directory.lookup(email) {
            None => Verdict::UnknownEmail,
            Some(record) if !record.is_active => {
                warn!(email = %email, user_id = record.id, "Login failed: account inactive");
                return Err(LoginError::AccountInactive);
            }
            Some(record) if verify_password(password, &record.password_hash).is_err() => {
                Verdict::WrongPassword
            }
            Some(record) if record.role != claimed_role => Verdict::RoleMismatch,
            Some(record) => Verdict::Accepted(record),
        };

        // Re-check and record under one lock. Attempts that finished while
        // this one was verifying may have locked the gate; the outcome of
        // this attempt is then withheld.
        let mut limiter = self.limiter();
        if let LimitResult::Locked { minutes } = limiter.check(email, now) {
            warn!(
                email = %email,
                remaining_minutes = minutes,
                "Login attempt blocked: locked during verification"
            );
            return Err(LoginError::Throttled { minutes });
        }

        let record = match verdict {
            Verdict::Accepted(record) => record,
            Verdict::UnknownEmail => {
                let remaining = limiter.record_failure(email, now);
                warn!(email = %email, remaining, "Login failed: unknown email");
                return Err(LoginError::InvalidCredentials { remaining });
            }
            Verdict::WrongPassword => {
                let remaining = limiter.record_failure(email, now);
                warn!(email = %email, remaining, "Login failed: wrong password");
                return Err(LoginError::InvalidCredentials { remaining });
            }
            Verdict::RoleMismatch => {
                let remaining = limiter.record_failure(email, now);
                warn!(
                    email = %email,
                    claimed = %claimed_role,
                    remaining,
                    "Login failed: role mismatch"
                );
                return Err(LoginError::InvalidCredentials { remaining });
            }
        };

        limiter.clear(email);
        drop(limiter);

        let auth = session.establish(AuthSession::new(record.role, record.id, email, now));
        info!(
            email = %email,
            user_id = auth.user_id,
            role = %auth.role,
            token = %auth.token,
            "Login successful"
        );
        Ok(auth)
    }

    fn check_throttle(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), LoginError> {
        match self.limiter().check(email, now) {
            LimitResult::Allowed => Ok(()),
            LimitResult::Locked { minutes } => {
                warn!(
                    email = %email,
                    remaining_minutes = minutes,
                    "Login attempt blocked: too many failures"
                );
                Err(LoginError::Throttled { minutes })
            }
        }
    }

    /// Check the session at the current time.
    pub fn check_session_validity(&self, session: &mut Session) -> SessionStatus {
        self.check_session_validity_at(session, Utc::now())
    }

    /// Check the session at `now`, logging it out if it has expired.
    pub fn check_session_validity_at(
        &self,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> SessionStatus {
        let Some(auth) = session.current() else {
            return SessionStatus::Unauthenticated;
        };

        if auth.is_expired(self.settings.session_lifetime(), now) {
            if let Some(auth) = session.clear() {
                info!(
                    user_id = auth.user_id,
                    token = %auth.token,
                    "Session expired"
                );
            }
            return SessionStatus::Expired;
        }

        SessionStatus::Valid
    }

    /// Log the session out. Logging out an empty session does nothing.
    pub fn logout(&self, session: &mut Session) {
        match session.clear() {
            Some(auth) => info!(
                user_id = auth.user_id,
                token = %auth.token,
                "Session logged out"
            ),
            None => debug!("Logout on unauthenticated session"),
        }
    }
}
