//! The `consolidate` command: build the catalog from local repository files
//! and registry labels.

use crate::catalog::sources::{self, RepositorySource};
use crate::catalog::{self, RepositoryEntry, Version, readme_reference};
use crate::context::AppContext;
use crate::readme::ReadmeFetcher;
use anyhow::{Context, Result};
use libhubcat::{AccessToken, Registry};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default base URL logo paths are appended to.
pub const DEFAULT_ASSET_BASE_URL: &str =
    "https://raw.githubusercontent.com/bluerobotics/BlueOS-Extensions-Repository/master/repos";

/// Settings of one consolidation run.
#[derive(Debug, Clone)]
pub struct ConsolidateOptions {
    /// Directory searched for repository description files
    pub repos_dir: PathBuf,
    /// Path the catalog is written to
    pub output: PathBuf,
    pub asset_base_url: String,
    /// Log and skip tags that fail instead of aborting the run
    pub skip_failed_tags: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from("repos"),
            output: PathBuf::from("manifest.json"),
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            skip_failed_tags: false,
        }
    }
}

/// Drives the registry for every tracked repository and tag.
pub struct Consolidator {
    registry: Registry,
    readmes: ReadmeFetcher,
    options: ConsolidateOptions,
}

impl Consolidator {
    pub fn new(registry: Registry, readmes: ReadmeFetcher, options: ConsolidateOptions) -> Self {
        Self {
            registry,
            readmes,
            options,
        }
    }

    /// Builds the catalog without writing it.
    pub async fn build_catalog(&self) -> Result<Vec<RepositoryEntry>> {
        let sources = sources::discover(&self.options.repos_dir)?;
        info!(
            count = sources.len(),
            dir = %self.options.repos_dir.display(),
            "discovered repositories"
        );

        let mut catalog = Vec::with_capacity(sources.len());
        for source in &sources {
            catalog.push(self.consolidate_repository(source).await?);
        }
        Ok(catalog)
    }

    /// Builds the catalog and writes it to the output path.
    ///
    /// Returns the number of repositories written.
    pub async fn run(&self) -> Result<usize> {
        let catalog = self.build_catalog().await?;
        catalog::write_catalog(&catalog, &self.options.output)?;
        info!(
            repositories = catalog.len(),
            output = %self.options.output.display(),
            "catalog written"
        );
        Ok(catalog.len())
    }

    async fn consolidate_repository(&self, source: &RepositorySource) -> Result<RepositoryEntry> {
        let mut entry = RepositoryEntry::from_source(
            source,
            &self.options.repos_dir,
            &self.options.asset_base_url,
        );

        let listing = self
            .registry
            .list_tags(&entry.docker)
            .await
            .with_context(|| format!("Failed to list tags of {}", entry.docker))?;

        for tag in &listing.tags {
            match self.build_version(&entry.docker, tag, &listing.token).await {
                Ok(version) => entry.versions.push(version),
                Err(err) if self.options.skip_failed_tags => {
                    let error = format!("{:#}", err);
                    warn!(repository = %entry.docker, tag = %tag, error = %error, "skipping tag");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(entry)
    }

    async fn build_version(&self, repository: &str, tag: &str, token: &AccessToken) -> Result<Version> {
        let labels = self
            .registry
            .fetch_tag_labels(repository, tag, token)
            .await
            .with_context(|| format!("Failed to fetch labels of {}:{}", repository, tag))?;

        let readme = self.readmes.fetch(&readme_reference(tag, &labels)).await?;

        Version::from_labels(tag, &labels, readme)
            .with_context(|| format!("Unable to parse labels of {}:{}", repository, tag))
    }
}

/// Handle the consolidate command
pub async fn handle_consolidate(ctx: &AppContext, options: ConsolidateOptions) -> Result<()> {
    let registry = ctx.registry()?;
    let readmes = ReadmeFetcher::new(ctx.config.network.timeout)?;

    let count = Consolidator::new(registry, readmes, options).run().await?;
    println!("Consolidated {} repositories", count);
    Ok(())
}

#[cfg(test)]
#[path = "consolidate_tests.rs"]
mod tests;
