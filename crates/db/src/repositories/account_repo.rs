//! Repository for the `accounts` table.

use chrono::Utc;

use crate::models::account::{Account, CreateAccount};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, credential_hash, created_at";

/// Provides lookup and creation of accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    ///
    /// Fails with a unique violation if the username is already taken.
    pub async fn create(pool: &DbPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (username, credential_hash, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.username)
            .bind(&input.credential_hash)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Return the account holding the username, inserting it first if no row
    /// exists yet.
    ///
    /// An existing row is returned without writing. Concurrent inserts
    /// converge on the one row the unique index admits.
    pub async fn create_if_absent(
        pool: &DbPool,
        input: &CreateAccount,
    ) -> Result<Account, sqlx::Error> {
        if let Some(existing) = Self::find_by_username(pool, &input.username).await? {
            return Ok(existing);
        }

        sqlx::query(
            "INSERT INTO accounts (username, credential_hash, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&input.username)
        .bind(&input.credential_hash)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Self::find_by_username(pool, &input.username)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find an account by username (case-sensitive).
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE username = ?1");
        sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Number of rows holding `username` (0 or 1 while the index holds).
    pub async fn count_by_username(pool: &DbPool, username: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE username = ?1")
            .bind(username)
            .fetch_one(pool)
            .await
    }
}
