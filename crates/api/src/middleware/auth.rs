//! HTTP Basic authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sightline_core::credentials::{parse_basic_authorization, Credentials};
use sightline_core::error::CoreError;
use sightline_core::types::DbId;

use crate::auth::identity::resolve_account;
use crate::error::AppError;
use crate::state::AppState;

/// Account behind the request; the anonymous account when no credentials
/// were sent.
///
/// ```ignore
/// async fn upload(account: ResolvedAccount) -> AppResult<Json<()>> {
///     tracing::info!(account_id = account.account_id, "handling upload");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAccount {
    pub account_id: DbId,
}

impl FromRequestParts<AppState> for ResolvedAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = match authorization_header(parts)? {
            Some(header) => parse_basic_authorization(header)?,
            None => None,
        };
        let account_id = resolve_account(&state.pool, credentials.as_ref()).await?;
        Ok(ResolvedAccount { account_id })
    }
}

/// Account behind a request that must carry an `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthAccount {
    pub account_id: DbId,
}

impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = authorization_header(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

        let credentials: Option<Credentials> = parse_basic_authorization(header)?;
        let account_id = resolve_account(&state.pool, credentials.as_ref()).await?;
        Ok(AuthAccount { account_id })
    }
}

fn authorization_header(parts: &Parts) -> Result<Option<&str>, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .map(|v| {
            v.to_str().map_err(|_| {
                AppError::Core(CoreError::Unauthorized(
                    "malformed authorization header".into(),
                ))
            })
        })
        .transpose()
}
