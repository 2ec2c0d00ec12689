//! Consolidated catalog model.
//!
//! A catalog is a list of repository entries, each with one version per
//! published tag. Versions are built from image labels. Several labels hold
//! JSON documents encoded as strings; they are decoded here, the registry
//! layer hands them over untouched.

pub mod sources;

use anyhow::{Context, Result};
use libhubcat::LabelSet;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::Path;

use sources::RepositorySource;


/// Placeholder in the `readme` label replaced by the tag name.
const TAG_PLACEHOLDER: &str = "{tag}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One published tag of a repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub permissions: Option<serde_json::Value>,
    pub requirements: Option<String>,
    pub tag: String,
    pub website: Option<String>,
    /// Author entries exactly as published in the `authors` label.
    pub authors: Vec<serde_json::Value>,
    pub docs: Option<serde_json::Value>,
    pub readme: String,
    pub company: Option<Company>,
    pub support: Option<String>,
}

impl Version {
    /// Builds a version from the labels of `tag`.
    ///
    /// `readme` is the already resolved readme text; see [`readme_reference`].
    pub fn from_labels(tag: &str, labels: &LabelSet, readme: String) -> Result<Self> {
        Ok(Self {
            permissions: decode_label(labels, "permissions")?,
            requirements: labels.get("requirements").cloned(),
            tag: tag.to_string(),
            website: labels.get("website").cloned(),
            authors: decode_label(labels, "authors")?.unwrap_or_default(),
            docs: decode_label(labels, "docs")?,
            readme,
            company: decode_label(labels, "company")?,
            support: labels.get("support").cloned(),
        })
    }
}

/// Returns the readme reference of `tag`: the `readme` label with the tag
/// placeholder substituted, or an empty string when the label is absent.
pub fn readme_reference(tag: &str, labels: &LabelSet) -> String {
    labels
        .get("readme")
        .map(|readme| readme.replace(TAG_PLACEHOLDER, tag))
        .unwrap_or_default()
}

/// Decodes a JSON-encoded label. Absent and empty labels decode to `None`.
fn decode_label<T: DeserializeOwned>(labels: &LabelSet, key: &str) -> Result<Option<T>> {
    match labels.get(key).map(|raw| raw.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .with_context(|| format!("Label '{}' is not valid JSON: {}", key, raw)),
    }
}

/// A repository with all of its resolved versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryEntry {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub docker: String,
    /// Versions in registry order, serialized as an object keyed by tag.
    #[serde(serialize_with = "serialize_versions")]
    pub versions: Vec<Version>,
    pub extension_logo: String,
    pub company_logo: String,
}

impl RepositoryEntry {
    /// Creates an entry without versions for a discovered repository file.
    ///
    /// Logo URLs point at `extension_logo.png` and `company_logo.png` next
    /// to the repository file, relative to `repos_dir`, under
    /// `asset_base_url`.
    pub fn from_source(source: &RepositorySource, repos_dir: &Path, asset_base_url: &str) -> Self {
        let description = &source.description;
        Self {
            identifier: description.identifier.clone(),
            name: description.name.clone(),
            description: description.description.clone(),
            docker: description.docker.clone(),
            versions: Vec::new(),
            extension_logo: source.asset_url(repos_dir, asset_base_url, "extension_logo.png"),
            company_logo: source.asset_url(repos_dir, asset_base_url, "company_logo.png"),
        }
    }
}

fn serialize_versions<S: Serializer>(versions: &[Version], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(versions.len()))?;
    for version in versions {
        map.serialize_entry(&version.tag, version)?;
    }
    map.end()
}

/// Renders the catalog as JSON indented with four spaces.
pub fn to_json(entries: &[RepositoryEntry]) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    entries
        .serialize(&mut serializer)
        .context("Failed to serialize catalog")?;
    String::from_utf8(buffer).context("Catalog JSON is not valid UTF-8")
}

/// Writes the catalog to `path`, replacing any previous file.
pub fn write_catalog(entries: &[RepositoryEntry], path: &Path) -> Result<()> {
    let json = to_json(entries)?;
    fs::write(path, json).with_context(|| format!("Failed to write catalog to {}", path.display()))
}
