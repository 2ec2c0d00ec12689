//! Discovery of tracked repositories on disk.
//!
//! Every `*.json` file below the repos directory describes one repository.
//! Logos live next to the description file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Contents of a repository description file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryDescription {
    pub identifier: String,
    pub name: String,
    pub description: String,
    /// Repository path on the registry (e.g. `bluerobotics/cockpit`)
    pub docker: String,
    #[serde(default)]
    pub readme: Option<String>,
}

/// A repository description and the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySource {
    pub path: PathBuf,
    pub description: RepositoryDescription,
}

impl RepositorySource {
    /// Reads and parses a single description file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Unable to read file {}", path.display()))?;
        let description = serde_json::from_str(&contents)
            .with_context(|| format!("Unable to parse file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            description,
        })
    }

    /// URL of an asset stored next to the description file.
    pub fn asset_url(&self, repos_dir: &Path, asset_base_url: &str, file_name: &str) -> String {
        let asset = self
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name);
        let relative = asset.strip_prefix(repos_dir).unwrap_or(&asset);
        let relative = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/{}", asset_base_url.trim_end_matches('/'), relative)
    }
}

/// Finds and parses all description files below `repos_dir`, sorted by path.
pub fn discover(repos_dir: &Path) -> Result<Vec<RepositorySource>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(repos_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", repos_dir.display()))?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            paths.push(entry.into_path());
        }
    }

    paths.iter().map(|path| RepositorySource::load(path)).collect()
}
