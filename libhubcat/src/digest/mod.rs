//! Content digests.
//!
//! A digest (`algorithm:hex`) is only ever used as a blob lookup key, so it
//! is kept as the exact string the registry returned. Blob content is not
//! verified against it.

use crate::error::{HubcatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;


/// Represents a content digest as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Returns the algorithm part (`sha256` in `sha256:abc...`), if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::Digest;
    /// use std::str::FromStr;
    ///
    /// let digest = Digest::from_str("sha256:4abcf206").unwrap();
    /// assert_eq!(digest.algorithm(), Some("sha256"));
    /// ```
    pub fn algorithm(&self) -> Option<&str> {
        self.0.split_once(':').map(|(algorithm, _)| algorithm)
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Digest {
    type Err = HubcatError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HubcatError::validation("Digest cannot be empty"));
        }
        Ok(Digest(s.to_string()))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
