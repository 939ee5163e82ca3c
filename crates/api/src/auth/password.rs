//! Argon2id hashing and verification of account secrets.
//!
//! Secrets are stored as PHC strings (algorithm, params and salt embedded in
//! the hash). Verification goes through the Argon2 verifier, which compares
//! digests in constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a plaintext secret using Argon2id with a random salt.
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch. A stored value that is not a PHC string
/// (such as the anonymous account's placeholder) never verifies.
pub fn verify_secret(secret: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return Ok(false);
    };
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}
