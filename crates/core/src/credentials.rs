//! HTTP Basic credential parsing.
//!
//! Turns a raw `Authorization` header value into [`Credentials`]. Whether the
//! credentials are *valid* is decided later by the identity resolver; this
//! module only enforces the shape rules that never need the store.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;

/// Username plus optional secret taken from a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// `None` when the header carried an empty secret.
    pub secret: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parse a `Basic <base64(username:secret)>` header value.
///
/// Returns `Ok(None)` when both username and secret are empty, which counts
/// as "no credentials supplied". A username-less secret is rejected.
pub fn parse_basic_authorization(header: &str) -> Result<Option<Credentials>, CoreError> {
    let header = header.trim();
    let (scheme, encoded) = header
        .split_once(' ')
        .ok_or_else(malformed)?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(malformed());
    }

    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (username, secret) = decoded.split_once(':').ok_or_else(malformed)?;

    match (username.is_empty(), secret.is_empty()) {
        (true, true) => Ok(None),
        (true, false) => Err(CoreError::Unauthorized("username required".into())),
        _ => Ok(Some(Credentials::new(username, Some(secret.to_string())))),
    }
}

fn malformed() -> CoreError {
    CoreError::Unauthorized("malformed authorization header".into())
}
