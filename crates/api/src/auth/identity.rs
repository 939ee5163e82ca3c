//! Resolves request credentials to a stable account id.
//!
//! Rules, in order:
//!
//! 1. No credentials -> the anonymous account (created on first use).
//! 2. Username without secret -> `401 secret required`.
//! 3. Known username -> verify the secret.
//! 4. Unknown username -> create the account with this secret.
//!
//! Failed attempts never write to the store. Argon2 hashing and verification
//! run on the blocking thread pool.

use sightline_core::accounts::{is_reserved_username, ANONYMOUS_CREDENTIAL, ANONYMOUS_USERNAME};
use sightline_core::credentials::Credentials;
use sightline_core::error::CoreError;
use sightline_core::types::DbId;
use sightline_db::models::account::{Account, CreateAccount};
use sightline_db::repositories::AccountRepo;
use sightline_db::DbPool;

use crate::auth::password::{hash_secret, verify_secret};
use crate::error::{AppError, AppResult};

/// Resolve `credentials` to an account id, creating accounts on demand.
pub async fn resolve_account(pool: &DbPool, credentials: Option<&Credentials>) -> AppResult<DbId> {
    let Some(credentials) = credentials else {
        return anonymous_account_id(pool).await;
    };

    if is_reserved_username(&credentials.username) {
        return Err(unauthorized("reserved username"));
    }

    let Some(secret) = credentials.secret.as_deref() else {
        return Err(unauthorized("secret required"));
    };

    if let Some(account) = AccountRepo::find_by_username(pool, &credentials.username).await? {
        return verify_account(&account, secret).await;
    }

    let owned_secret = secret.to_owned();
    let credential_hash = tokio::task::spawn_blocking(move || hash_secret(&owned_secret))
        .await
        .map_err(|e| AppError::InternalError(format!("Credential hashing task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Credential hashing error: {e}")))?;
    let input = CreateAccount {
        username: credentials.username.clone(),
        credential_hash,
    };

    match AccountRepo::create(pool, &input).await {
        Ok(account) => {
            tracing::info!(
                account_id = account.id,
                username = %account.username,
                "Created account on first login",
            );
            Ok(account.id)
        }
        Err(err) if sightline_db::is_unique_violation(&err) => {
            // A concurrent request created the username first; use its row.
            tracing::debug!(username = %input.username, "Lost account creation race, re-fetching");
            let account = AccountRepo::find_by_username(pool, &input.username)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict(format!(
                        "Account '{}' could not be created or found",
                        input.username
                    ))
                })?;
            verify_account(&account, secret).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Id of the anonymous account, creating it if absent.
pub async fn anonymous_account_id(pool: &DbPool) -> AppResult<DbId> {
    let account = AccountRepo::create_if_absent(
        pool,
        &CreateAccount {
            username: ANONYMOUS_USERNAME.to_string(),
            credential_hash: ANONYMOUS_CREDENTIAL.to_string(),
        },
    )
    .await?;
    Ok(account.id)
}

async fn verify_account(account: &Account, secret: &str) -> AppResult<DbId> {
    let secret = secret.to_owned();
    let stored = account.credential_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_secret(&secret, &stored))
        .await
        .map_err(|e| AppError::InternalError(format!("Credential verification task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Credential verification error: {e}")))?;

    if valid {
        Ok(account.id)
    } else {
        Err(unauthorized("incorrect credential"))
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
