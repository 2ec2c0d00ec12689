//! Library configuration.
//!
//! This module holds the registry endpoints, network settings and platform
//! override used by [`crate::registry::Registry`]. Values start from
//! defaults that target Docker Hub and can be merged with a YAML file.

use crate::error::{HubcatError, Result};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryEndpoints,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub platform: PlatformOverride,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default())?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// Without a path the defaults are returned. A path that does not exist
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ConfigRs::builder().add_source(ConfigRs::try_from(&Config::default())?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder, path)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                HubcatError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Base URLs of the three services a Docker Hub style registry exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryEndpoints {
    /// Token service issuing pull-scoped bearer tokens.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// `service` parameter sent to the token service.
    #[serde(default = "default_service")]
    pub service: String,

    /// Hub API serving the recency-ordered tag listing.
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// Distribution API serving manifests and blobs.
    #[serde(default = "default_index_url")]
    pub index_url: String,
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            service: default_service(),
            hub_url: default_hub_url(),
            index_url: default_index_url(),
        }
    }
}

impl RegistryEndpoints {
    /// Points all three services at a single base URL.
    ///
    /// Useful for mirrors and for tests, where one server answers every path.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::config::RegistryEndpoints;
    ///
    /// let endpoints = RegistryEndpoints::single_host("http://127.0.0.1:5000/");
    /// assert_eq!(endpoints.auth_url, "http://127.0.0.1:5000");
    /// assert_eq!(endpoints.index_url, "http://127.0.0.1:5000");
    /// ```
    pub fn single_host(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            auth_url: base.clone(),
            service: default_service(),
            hub_url: base.clone(),
            index_url: base,
        }
    }
}

fn default_auth_url() -> String {
    "https://auth.docker.io".to_string()
}

fn default_service() -> String {
    "registry.docker.io".to_string()
}

fn default_hub_url() -> String {
    "https://hub.docker.com".to_string()
}

fn default_index_url() -> String {
    "https://registry-1.docker.io".to_string()
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}

/// Host platform override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlatformOverride {
    /// Machine name as reported by `uname -m` (e.g. `x86_64`). When unset the
    /// architecture of the running binary is used.
    #[serde(default)]
    pub machine: Option<String>,
}
