//! Platform descriptors and host architecture mapping.
//!
//! Manifest indexes list one entry per `os/architecture` pair. To pick the
//! entry for the running host, the host machine name is mapped onto the
//! architecture names the registry uses. Unknown machines are rejected
//! instead of falling back to a guess.

use crate::error::{HubcatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;


/// The only operating system entries are ever selected for.
pub const LINUX: &str = "linux";

/// Machine names (as reported by `uname -m`) and their registry architecture.
///
/// `arm` is what Rust reports for the 32-bit ARM targets that `uname` calls
/// `armv7l`.
const ARCH_MAP: &[(&str, &str)] = &[
    ("x86_64", "amd64"),
    ("aarch64", "arm"),
    ("armv7l", "arm"),
    ("arm", "arm"),
];

/// An `os/architecture` pair as found in a manifest index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub architecture: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
        }
    }

    /// Returns the linux platform matching a host machine name.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::platform::Platform;
    ///
    /// let platform = Platform::for_machine("x86_64").unwrap();
    /// assert_eq!(platform.to_string(), "linux/amd64");
    ///
    /// assert!(Platform::for_machine("riscv64").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::UnsupportedArchitecture`] for any machine name
    /// without a mapping.
    pub fn for_machine(machine: &str) -> Result<Self> {
        let architecture = registry_architecture(machine)?;
        Ok(Self::new(LINUX, architecture))
    }

    /// Returns the linux platform of the running binary.
    pub fn host() -> Result<Self> {
        Self::for_machine(host_machine())
    }

    /// Whether an index entry for `self` can run on `host`.
    ///
    /// Only `os` and `architecture` are compared.
    pub fn is_compatible_with(&self, host: &Platform) -> bool {
        self.os == host.os && self.architecture == host.architecture
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)
    }
}

/// Maps a host machine name onto the registry's architecture name.
pub fn registry_architecture(machine: &str) -> Result<&'static str> {
    ARCH_MAP
        .iter()
        .find(|(name, _)| *name == machine)
        .map(|(_, arch)| *arch)
        .ok_or_else(|| HubcatError::unsupported_architecture(machine))
}

/// Machine name of the running binary.
pub fn host_machine() -> &'static str {
    std::env::consts::ARCH
}
