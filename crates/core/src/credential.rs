//! Submission password checks.
//!
//! The configured submission secret is either a PHC-formatted Argon2 hash or,
//! for older deployments, plain text. [`verify_submission_password`] handles
//! both so a deployment can switch to a hashed secret without code changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::CoreError;

/// PHC identifier prefix of Argon2 hashes (`$argon2id$`, `$argon2i$`, ...).
const ARGON2_PREFIX: &str = "$argon2";

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    if password.is_empty() {
        return Err(CoreError::Validation("password cannot be empty".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(false)` on mismatch; a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| CoreError::Internal(format!("stored password hash is malformed: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!("password verification failed: {e}"))),
    }
}

/// Whether a configured secret is already hashed.
pub fn is_password_hashed(secret: &str) -> bool {
    secret.starts_with(ARGON2_PREFIX)
}

/// Check a submission password against the configured secret.
///
/// Fails with [`CoreError::InvalidCredential`] on mismatch or an empty
/// password.
pub fn verify_submission_password(password: &str, configured: &str) -> Result<(), CoreError> {
    if password.is_empty() || configured.is_empty() {
        return Err(CoreError::InvalidCredential);
    }
    let matches = if is_password_hashed(configured) {
        verify_password(password, configured)?
    } else {
        password == configured
    };
    if matches {
        Ok(())
    } else {
        Err(CoreError::InvalidCredential)
    }
}
