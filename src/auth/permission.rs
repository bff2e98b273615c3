//! Role checks for dashboard access.

use thiserror::Error;

use super::session::{AuthSession, Session};
use crate::directory::Role;

/// Permission-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The session belongs to a different role.
    #[error("the {required} dashboard is not available to the {actual} role")]
    WrongRole { required: Role, actual: Role },

    /// No one is logged in.
    #[error("login required")]
    NotAuthenticated,
}

/// Require an authenticated session of exactly `required` role.
///
/// Roles are not ranked: an admin cannot open the student dashboard.
///
/// # Examples
///
/// ```
/// use schoolgate::auth::{require_role, PermissionError, Session};
/// use schoolgate::Role;
///
/// let session = Session::new();
/// assert_eq!(
///     require_role(&session, Role::Admin).unwrap_err(),
///     PermissionError::NotAuthenticated
/// );
/// ```
pub fn require_role(session: &Session, required: Role) -> Result<&AuthSession, PermissionError> {
    let auth = session.current().ok_or(PermissionError::NotAuthenticated)?;
    if auth.role != required {
        return Err(PermissionError::WrongRole {
            required,
            actual: auth.role,
        });
    }
    Ok(auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session_for(role: Role) -> Session {
        let mut session = Session::new();
        session.establish(AuthSession::new(role, 1, "x@test.com", Utc::now()));
        session
    }

    #[test]
    fn test_require_role_matching() {
        let session = session_for(Role::Teacher);
        let auth = require_role(&session, Role::Teacher).unwrap();
        assert_eq!(auth.user_id, 1);
    }

    #[test]
    fn test_require_role_mismatch() {
        let session = session_for(Role::Admin);
        assert_eq!(
            require_role(&session, Role::Student).unwrap_err(),
            PermissionError::WrongRole {
                required: Role::Student,
                actual: Role::Admin
            }
        );
    }

    #[test]
    fn test_require_role_unauthenticated() {
        let session = Session::new();
        assert_eq!(
            require_role(&session, Role::Hod).unwrap_err(),
            PermissionError::NotAuthenticated
        );
    }

    #[test]
    fn test_permission_error_display() {
        let err = PermissionError::WrongRole {
            required: Role::Admin,
            actual: Role::Student,
        };
        assert_eq!(
            err.to_string(),
            "the admin dashboard is not available to the student role"
        );
    }
}
