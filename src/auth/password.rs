//! Password digests for schoolgate.
//!
//! Directory records carry an unsalted SHA-256 hex digest. That scheme is
//! fast and unsalted, so it is only a placeholder: records may instead carry
//! an Argon2id PHC string, which `verify_password` recognizes by its `$argon2`
//! prefix. The gate itself never needs to know which scheme a record uses.

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Length of a SHA-256 digest in hex characters.
pub const SHA256_HEX_LENGTH: usize = 64;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Stored digest is neither a SHA-256 hex string nor a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

/// Compute the legacy digest: lowercase hex SHA-256 of the UTF-8 password.
///
/// # Examples
///
/// ```
/// use schoolgate::hash_password;
///
/// let digest = hash_password("test123");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_password("test123"));
/// ```
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Verify a password against a stored digest.
///
/// SHA-256 digests are compared in constant time.
///
/// # Examples
///
/// ```
/// use schoolgate::{hash_password, verify_password};
///
/// let stored = hash_password("test123");
/// assert!(verify_password("test123", &stored).is_ok());
/// assert!(verify_password("wrong", &stored).is_err());
/// ```
pub fn verify_password(password: &str, stored: &str) -> Result<(), PasswordError> {
    if stored.starts_with("$argon2") {
        let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| PasswordError::VerificationFailed);
    }

    if !is_sha256_hex(stored) {
        return Err(PasswordError::InvalidHash);
    }

    let computed = hash_password(password);
    let stored = stored.to_ascii_lowercase();
    if bool::from(computed.as_bytes().ct_eq(stored.as_bytes())) {
        Ok(())
    } else {
        Err(PasswordError::VerificationFailed)
    }
}

/// Check whether a string looks like a SHA-256 hex digest.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == SHA256_HEX_LENGTH && s.bytes().all(|b| b.is_ascii_hexdigit())
}
