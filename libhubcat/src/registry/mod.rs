//! Registry operations module.
//!
//! This module provides the operations the catalog is built from: issuing a
//! pull token, listing tags, resolving a tag to its config digest and
//! reading the labels out of the config blob. Each repository's flow carries
//! its own [`AccessToken`]; the registry itself holds no per-flow state, so
//! independent flows can run concurrently on clones of one `Registry`.

use crate::auth::AccessToken;
use crate::client::{Client, ClientConfig};
use crate::config::Config;
use crate::digest::Digest;
use crate::error::{HubcatError, Result};
use crate::oci::{ImageConfigBlob, LabelSet, ManifestDocument};
use crate::platform::{Platform, host_machine};
use tracing::{debug, info};

#[cfg(test)]
mod tests;

/// Tags of one repository together with the token obtained while listing them.
///
/// The token is handed to the resolution calls for the same repository.
#[derive(Debug, Clone)]
pub struct TagListing {
    pub token: AccessToken,
    /// Tag names, most recently updated first.
    pub tags: Vec<String>,
}

/// High-level registry client.
#[derive(Debug, Clone)]
pub struct Registry {
    client: Client,
    /// Host machine name used to pick entries from manifest indexes.
    machine: String,
}

impl Registry {
    /// Creates a new `Registry` resolving for the running host.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::client::Client;
    /// use libhubcat::config::RegistryEndpoints;
    /// use libhubcat::registry::Registry;
    ///
    /// let client = Client::new(RegistryEndpoints::default()).unwrap();
    /// let registry = Registry::new(client);
    /// ```
    pub fn new(client: Client) -> Self {
        Self {
            client,
            machine: host_machine().to_string(),
        }
    }

    /// Builds a `Registry` from library configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::with_config(
            config.registry.clone(),
            ClientConfig::from(&config.network),
        )?;
        let registry = Self::new(client);

        Ok(match &config.platform.machine {
            Some(machine) => registry.with_machine(machine),
            None => registry,
        })
    }

    /// Resolves manifest indexes as if running on `machine` (e.g. `aarch64`).
    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    /// Returns the machine name indexes are resolved for.
    pub fn machine(&self) -> &str {
        &self.machine
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Obtains a pull-scoped token for `repository`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty repository path, and
    /// [`HubcatError::Authentication`] when the token service refuses.
    pub async fn get_token(&self, repository: &str) -> Result<AccessToken> {
        Self::check_repository(repository)?;
        self.client.fetch_token(repository).await
    }

    /// Lists the tags of `repository`, most recently updated first.
    ///
    /// A token is obtained first. The hub listing does not need it, but
    /// failing here stops the repository before any tag is processed, and
    /// the token is returned for the resolution calls that follow.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use libhubcat::registry::Registry;
    /// # async fn example(registry: Registry) -> libhubcat::Result<()> {
    /// let listing = registry.list_tags("bluerobotics/core").await?;
    /// for tag in &listing.tags {
    ///     let labels = registry
    ///         .fetch_tag_labels("bluerobotics/core", tag, &listing.token)
    ///         .await?;
    ///     println!("{}: {} labels", tag, labels.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_tags(&self, repository: &str) -> Result<TagListing> {
        let token = self.get_token(repository).await?;
        let tags = self.client.fetch_tags(repository).await?;
        info!(repository, count = tags.len(), "listed tags");

        Ok(TagListing { token, tags })
    }

    /// Resolves `repository:tag` to the digest of its configuration blob.
    ///
    /// The host architecture is checked before any request is made. For a
    /// manifest index, exactly one `linux` entry of that architecture must
    /// exist.
    ///
    /// # Errors
    ///
    /// - [`HubcatError::UnsupportedArchitecture`] when the host machine has
    ///   no mapping
    /// - [`HubcatError::ManifestFetch`] on a non-200 manifest response
    /// - [`HubcatError::AmbiguousManifest`] when an index has zero or several
    ///   entries for this platform
    pub async fn resolve_config_digest(
        &self,
        repository: &str,
        tag: &str,
        token: &AccessToken,
    ) -> Result<Digest> {
        let host = Platform::for_machine(&self.machine)?;
        Self::check_repository(repository)?;

        let bytes = self.client.fetch_manifest(repository, tag, token).await?;
        let document = ManifestDocument::from_bytes(&bytes)?;
        if document.is_index() {
            debug!(
                repository,
                tag,
                platform = %host,
                candidates = document.compatible_entries(&host).len(),
                "selecting manifest from index"
            );
        }

        let digest = document.config_digest(repository, tag, &host)?;
        info!(repository, tag, %digest, "resolved digest");
        Ok(digest)
    }

    /// Fetches the labels of the configuration blob at `digest`.
    ///
    /// A blob without labels yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`HubcatError::BlobFetch`] on a non-200 response.
    pub async fn fetch_labels(
        &self,
        repository: &str,
        digest: &Digest,
        token: &AccessToken,
    ) -> Result<LabelSet> {
        let bytes = self.client.fetch_blob(repository, digest, token).await?;
        let labels = ImageConfigBlob::from_bytes(&bytes)?.into_labels();
        debug!(repository, %digest, count = labels.len(), "read labels");
        Ok(labels)
    }

    /// Resolves `repository:tag` and fetches its labels with one token.
    pub async fn fetch_tag_labels(
        &self,
        repository: &str,
        tag: &str,
        token: &AccessToken,
    ) -> Result<LabelSet> {
        let digest = self.resolve_config_digest(repository, tag, token).await?;
        self.fetch_labels(repository, &digest, token).await
    }

    fn check_repository(repository: &str) -> Result<()> {
        if repository.trim().is_empty() {
            return Err(HubcatError::validation("Repository path cannot be empty"));
        }
        Ok(())
    }
}
