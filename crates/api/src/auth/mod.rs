//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and constant-time verification of account secrets.
//! - [`identity`] -- Resolves request credentials to an account id.

pub mod identity;
pub mod password;
