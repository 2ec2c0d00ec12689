//! Readme resolution.
//!
//! A readme reference is either a URL to fetch or the readme text itself.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ReadmeFetcher {
    http_client: reqwest::Client,
}

impl ReadmeFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client })
    }

    /// Resolves a readme reference to readme text.
    ///
    /// References not starting with `http` are inline readmes and returned
    /// unchanged, including the empty string.
    pub async fn fetch(&self, reference: &str) -> Result<String> {
        if !reference.starts_with("http") {
            debug!("readme is not a url, treating it as inline text");
            return Ok(reference.to_string());
        }

        debug!(url = reference, "fetching readme");
        let response = self
            .http_client
            .get(reference)
            .send()
            .await
            .with_context(|| format!("Could not get readme {}", reference))?;

        if response.status() != StatusCode::OK {
            bail!(
                "Could not get readme {} (status: {})",
                reference,
                response.status().as_u16()
            );
        }

        response
            .text()
            .await
            .with_context(|| format!("Could not read readme {}", reference))
    }
}

#[cfg(test)]
#[path = "readme_tests.rs"]
mod tests;
