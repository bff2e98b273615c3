//! Authentication module for schoolgate.
//!
//! Password digests, login throttling, session records, the login gate and
//! dashboard role checks.

mod gate;
mod password;
mod permission;
mod session;
mod throttle;

pub use gate::{GateSettings, LoginError, SessionGate};
pub use password::{hash_password, is_sha256_hex, verify_password, PasswordError};
pub use permission::{require_role, PermissionError};
pub use session::{AuthSession, Session, SessionStatus, DEFAULT_SESSION_HOURS};
pub use throttle::{
    LimitResult, LoginLimiter, ThrottleScope, ThrottleState, LOCKOUT_MINUTES, MAX_LOGIN_ATTEMPTS,
};
