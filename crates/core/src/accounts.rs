//! Account naming rules.

/// Username of the single account that owns all unauthenticated activity.
pub const ANONYMOUS_USERNAME: &str = "__anonymous__";

/// Stored credential of the anonymous account.
///
/// Deliberately not a PHC hash string, so no secret can ever verify against it.
pub const ANONYMOUS_CREDENTIAL: &str = "!";

/// Whether `username` is reserved and may not be claimed with credentials.
pub fn is_reserved_username(username: &str) -> bool {
    username == ANONYMOUS_USERNAME
}
