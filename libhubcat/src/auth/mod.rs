//! Pull-token authentication.
//!
//! Docker Hub hands out short-lived bearer tokens scoped to pull access on a
//! single repository. A token is requested once per repository and passed
//! explicitly to every call that needs it; nothing here stores it.

use serde::Deserialize;
use std::fmt;


/// A bearer token granting pull access to one repository.
///
/// The registry gives it an expiry, but it is not tracked: a token lives for
/// the duration of one repository's resolution flow.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::auth::AccessToken;
    ///
    /// let token = AccessToken::new("abc");
    /// assert_eq!(token.to_header_value(), "Bearer abc");
    /// ```
    pub fn to_header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Body of a successful token service response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Scope requesting pull access on `repository`.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     libhubcat::auth::pull_scope("bluerobotics/core"),
///     "repository:bluerobotics/core:pull"
/// );
/// ```
pub fn pull_scope(repository: &str) -> String {
    format!("repository:{}:pull", repository)
}
