//! Registry document models.
//!
//! Only the fields needed to go from a tag to its labels are modelled:
//! the config descriptor of a manifest, the platform entries of an index,
//! and the `config.Labels` map of an image configuration blob. Everything
//! else in these documents is ignored.

use crate::digest::Digest;
use crate::error::{HubcatError, Result};
use crate::platform::Platform;
use oci_spec::image::MediaType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// Labels of an image configuration. Values are kept as raw strings, even
/// when they hold JSON.
pub type LabelSet = HashMap<String, String>;

/// Docker schema 2 single-platform manifest.
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Value of the `Accept` header sent when requesting a manifest.
///
/// The registry may answer with any of these documents.
///
/// # Examples
///
/// ```
/// let accept = libhubcat::oci::manifest_accept_header();
/// assert!(accept.contains("application/vnd.oci.image.index.v1+json"));
/// ```
pub fn manifest_accept_header() -> String {
    [
        DOCKER_MANIFEST_V2.to_string(),
        MediaType::ImageManifest.to_string(),
        MediaType::ImageIndex.to_string(),
    ]
    .join(",")
}

/// Reference to a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub digest: Digest,
}

/// A single-platform manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageManifest {
    pub config: Descriptor,
}

/// One platform-specific manifest listed in an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub digest: Digest,
    #[serde(default)]
    pub platform: Option<Platform>,
}

/// A multi-platform manifest index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageIndex {
    pub manifests: Vec<IndexEntry>,
}

/// Either a single-platform manifest or a multi-platform index.
///
/// The variant is decided by which discriminating field the document
/// carries: `config` for a manifest, `manifests` for an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestDocument {
    Manifest(ImageManifest),
    Index(ImageIndex),
}

impl ManifestDocument {
    /// Parses manifest bytes, dispatching on the discriminating field.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the body is not JSON, carries neither
    /// `config` nor `manifests`, or the chosen shape does not deserialize.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| HubcatError::validation_with_source("Failed to parse manifest JSON", e))?;

        if value.get("config").is_some_and(|c| c.is_object()) {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                HubcatError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestDocument::Manifest(manifest))
        } else if value.get("manifests").is_some_and(|m| m.is_array()) {
            let index: ImageIndex = serde_json::from_value(value).map_err(|e| {
                HubcatError::validation_with_source("Failed to parse image index", e)
            })?;
            Ok(ManifestDocument::Index(index))
        } else {
            Err(HubcatError::validation(
                "Manifest carries neither a config object nor a manifests list",
            ))
        }
    }

    /// Returns true if this is a multi-platform index.
    pub fn is_index(&self) -> bool {
        matches!(self, ManifestDocument::Index(_))
    }

    /// Index entries runnable on `host`. Always empty for a single manifest.
    pub fn compatible_entries(&self, host: &Platform) -> Vec<&IndexEntry> {
        match self {
            ManifestDocument::Manifest(_) => vec![],
            ManifestDocument::Index(index) => index
                .manifests
                .iter()
                .filter(|entry| {
                    entry
                        .platform
                        .as_ref()
                        .is_some_and(|platform| platform.is_compatible_with(host))
                })
                .collect(),
        }
    }

    /// Resolves the digest to fetch for `host`.
    ///
    /// A manifest yields its config digest. An index yields the digest of
    /// its single entry compatible with `host`; `repository` and `tag` only
    /// label the error when there is not exactly one.
    pub fn config_digest(&self, repository: &str, tag: &str, host: &Platform) -> Result<Digest> {
        match self {
            ManifestDocument::Manifest(manifest) => Ok(manifest.config.digest.clone()),
            ManifestDocument::Index(_) => match self.compatible_entries(host).as_slice() {
                [entry] => Ok(entry.digest.clone()),
                candidates => Err(HubcatError::ambiguous_manifest(
                    repository,
                    tag,
                    candidates.len(),
                )),
            },
        }
    }
}

/// The container section of an image configuration blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "Labels", default)]
    pub labels: Option<LabelSet>,
}

/// An image configuration blob, reduced to its labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageConfigBlob {
    #[serde(default)]
    pub config: Option<ContainerConfig>,
}

impl ImageConfigBlob {
    /// Parses a configuration blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| HubcatError::validation_with_source("Failed to parse config blob", e))
    }

    /// Returns the labels, or an empty set when the blob has none.
    pub fn into_labels(self) -> LabelSet {
        self.config
            .and_then(|config| config.labels)
            .unwrap_or_default()
    }
}
