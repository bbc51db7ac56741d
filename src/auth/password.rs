//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, which carry their own salt and
//! parameters, so verification needs nothing but the stored string.

use crate::errors::{AppResult, AuthError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hashes a password with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if argon2 rejects the input.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the stored string is not a valid PHC hash.
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string()).into()),
    }
}
