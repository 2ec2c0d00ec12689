//! HTTP client for Docker Hub style registries.
//!
//! This module provides a thin HTTP client built on reqwest. It knows the
//! four endpoints hubcat talks to (token service, hub tag listing, manifest
//! and blob) and turns every non-200 answer into the typed error of the
//! call site that produced it. Requests are sent exactly once.

use crate::auth::{AccessToken, TokenResponse, pull_scope};
use crate::config::{Network, RegistryEndpoints};
use crate::digest::Digest;
use crate::error::{HubcatError, Result};
use crate::oci::manifest_accept_header;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;


/// Number of tags requested from the hub. Only the first page is read.
pub const TAG_PAGE_SIZE: u32 = 25;

/// Response from the hub tag listing endpoint.
#[derive(Debug, Deserialize)]
struct HubTagsResponse {
    /// URL of the next page, if the listing was truncated
    #[serde(default)]
    next: Option<String>,
    results: Vec<HubTag>,
}

#[derive(Debug, Deserialize)]
struct HubTag {
    name: String,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libhubcat::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl From<&Network> for ClientConfig {
    fn from(network: &Network) -> Self {
        Self {
            timeout_seconds: network.timeout,
            max_idle_per_host: network.max_idle_per_host,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client for registry operations.
///
/// Cloning is cheap and clones share one connection pool. The client holds
/// no per-repository state, so clones can serve concurrent resolutions.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: ReqwestClient,
    endpoints: RegistryEndpoints,
    timeout_seconds: u64,
}

impl Client {
    /// Creates a new client for the given endpoints with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::client::Client;
    /// use libhubcat::config::RegistryEndpoints;
    ///
    /// let client = Client::new(RegistryEndpoints::default()).unwrap();
    /// assert_eq!(client.endpoints().index_url, "https://registry-1.docker.io");
    /// ```
    pub fn new(endpoints: RegistryEndpoints) -> Result<Self> {
        Self::with_config(endpoints, ClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(endpoints: RegistryEndpoints, config: ClientConfig) -> Result<Self> {
        let endpoints = RegistryEndpoints {
            auth_url: Self::normalize_url(&endpoints.auth_url)?,
            service: endpoints.service,
            hub_url: Self::normalize_url(&endpoints.hub_url)?,
            index_url: Self::normalize_url(&endpoints.index_url)?,
        };

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| HubcatError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            endpoints,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Normalizes a base URL by ensuring it has a scheme and removing trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(HubcatError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the normalized endpoints.
    pub fn endpoints(&self) -> &RegistryEndpoints {
        &self.endpoints
    }

    /// Requests a pull-scoped token for `repository` from the token service.
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::Authentication`] if the service answers with
    /// anything but 200, or with a body that is not JSON or lacks a `token`
    /// field.
    pub async fn fetch_token(&self, repository: &str) -> Result<AccessToken> {
        let url = format!("{}/token", self.endpoints.auth_url);
        debug!(%url, repository, "requesting pull token");

        let request = self.http_client.get(&url).query(&[
            ("service", self.endpoints.service.as_str()),
            ("scope", pull_scope(repository).as_str()),
        ]);
        let response = self.send(request, &url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HubcatError::authentication(
                repository,
                Some(status.as_u16()),
                "Could not get auth token",
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            HubcatError::authentication(
                repository,
                Some(status.as_u16()),
                format!("Token response is not valid JSON: {}", e),
            )
        })?;

        body.token.map(AccessToken::new).ok_or_else(|| {
            HubcatError::authentication(
                repository,
                Some(status.as_u16()),
                "Token response did not contain a token",
            )
        })
    }

    /// Fetches the first page of tags for `repository`, most recently
    /// updated first.
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::TagFetch`] on any non-200 status.
    pub async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/v2/repositories/{}/tags/",
            self.endpoints.hub_url, repository
        );
        debug!(%url, "listing tags");

        let page_size = TAG_PAGE_SIZE.to_string();
        let request = self.http_client.get(&url).query(&[
            ("page_size", page_size.as_str()),
            ("page", "1"),
            ("ordering", "last_updated"),
        ]);
        let response = self.send(request, &url).await?;

        if response.status() != StatusCode::OK {
            return Err(HubcatError::tag_fetch(
                repository,
                response.status().as_u16(),
            ));
        }

        let page: HubTagsResponse = response.json().await.map_err(|e| {
            HubcatError::validation_with_source("Failed to parse tags response", e)
        })?;

        if page.next.is_some() {
            debug!(
                repository,
                page_size = TAG_PAGE_SIZE,
                "tag listing truncated to first page"
            );
        }

        Ok(page.results.into_iter().map(|tag| tag.name).collect())
    }

    /// Fetches the raw manifest (or index) document for `repository:tag`.
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::ManifestFetch`] on any non-200 status. The
    /// error carries the request URL and the response body.
    pub async fn fetch_manifest(
        &self,
        repository: &str,
        tag: &str,
        token: &AccessToken,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.endpoints.index_url, repository, tag
        );
        debug!(%url, "fetching manifest");

        let request = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, token.to_header_value())
            .header(ACCEPT, manifest_accept_header());
        let response = self.send(request, &url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("(unable to read response body)"));
            return Err(HubcatError::manifest_fetch(
                repository,
                tag,
                url,
                status.as_u16(),
                body,
            ));
        }

        Self::read_bytes(response, "manifest").await
    }

    /// Fetches the blob stored under `digest` in `repository`.
    ///
    /// The content is returned as-is; it is not checked against the digest.
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::BlobFetch`] on any non-200 status.
    pub async fn fetch_blob(
        &self,
        repository: &str,
        digest: &Digest,
        token: &AccessToken,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v2/{}/blobs/{}",
            self.endpoints.index_url, repository, digest
        );
        debug!(%url, "fetching blob");

        let request = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, token.to_header_value())
            .header(ACCEPT, manifest_accept_header());
        let response = self.send(request, &url).await?;

        if response.status() != StatusCode::OK {
            return Err(HubcatError::blob_fetch(
                repository,
                digest.as_str(),
                response.status().as_u16(),
            ));
        }

        Self::read_bytes(response, "blob").await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e, url))
    }

    async fn read_bytes(response: Response, what: &str) -> Result<Vec<u8>> {
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| HubcatError::network_with_source(format!("Failed to read {} response", what), e))
    }

    /// Translates a reqwest error into a HubcatError.
    fn translate_reqwest_error(&self, error: reqwest::Error, url: &str) -> HubcatError {
        if error.is_timeout() {
            HubcatError::network_with_source(
                format!(
                    "Request to {} timed out after {} seconds",
                    url, self.timeout_seconds
                ),
                error,
            )
        } else if error.is_connect() {
            HubcatError::network_with_source(format!("Failed to connect to {}", url), error)
        } else {
            HubcatError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }
}
