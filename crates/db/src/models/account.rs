//! Account entity model and DTOs.

use sightline_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full account row from the `accounts` table.
///
/// Contains the credential hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub username: String,
    pub credential_hash: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new account.
#[derive(Debug)]
pub struct CreateAccount {
    pub username: String,
    pub credential_hash: String,
}
