//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values (`--config` or `HUBCAT_CONFIG`)
//! 3. Environment variables
//!
//! Command flags are applied on top by each command. Once built, the
//! context is passed as read-only throughout the application.

use anyhow::{Context, Result};
use libhubcat::{Config, Registry};
use std::env;
use std::path::Path;

/// Overrides the machine name manifest indexes are resolved for.
pub const MACHINE_ENV: &str = "HUBCAT_MACHINE";

/// Application context with resolved configuration
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved library configuration
    pub config: Config,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars
    pub fn build(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::load(config_path).with_context(|| match config_path {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to build default config".to_string(),
        })?;

        if let Ok(machine) = env::var(MACHINE_ENV) {
            config.platform.machine = Some(machine);
        }

        Ok(Self { config })
    }

    /// Creates a registry client from the resolved configuration.
    pub fn registry(&self) -> Result<Registry> {
        Registry::from_config(&self.config).context("Failed to create registry client")
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
