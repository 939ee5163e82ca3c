//! Request extractors that resolve the calling account.
//!
//! - [`auth::ResolvedAccount`] -- Basic credentials optional; anonymous when absent.
//! - [`auth::AuthAccount`] -- Basic `Authorization` header required.

pub mod auth;
