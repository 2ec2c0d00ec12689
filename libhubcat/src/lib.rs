//! hubcat - container image label catalog library
//!
//! libhubcat talks to a Docker Hub style registry and turns published image
//! tags into the label sets embedded in their configuration blobs.
//!
//! # Quick Start
//!
//! ```no_run
//! use libhubcat::{Config, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::from_config(&Config::default())?;
//!
//!     let listing = registry.list_tags("bluerobotics/core").await?;
//!     for tag in &listing.tags {
//!         let labels = registry
//!             .fetch_tag_labels("bluerobotics/core", tag, &listing.token)
//!             .await?;
//!         println!("{}: {:?}", tag, labels);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Flow
//!
//! For each repository a pull token is obtained ([`Registry::get_token`],
//! done implicitly by [`Registry::list_tags`]). Each tag is then resolved to
//! the digest of its configuration blob ([`Registry::resolve_config_digest`]),
//! picking the entry for the host platform when the tag points to a
//! multi-architecture index, and the labels are read from that blob
//! ([`Registry::fetch_labels`]).
//!
//! Nothing is cached and nothing is retried. Every failure surfaces as a
//! [`HubcatError`] naming the call site, repository and status.

#![warn(clippy::all)]

/// Returns the libhubcat crate version.
///
/// # Examples
///
/// ```
/// let version = libhubcat::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use auth::AccessToken;
pub use config::Config;
pub use digest::Digest;
pub use error::{HubcatError, Result};
pub use oci::{LabelSet, ManifestDocument};
pub use platform::Platform;
pub use registry::{Registry, TagListing};

pub mod auth;
pub mod client;
pub mod config;
pub mod digest;
pub mod error;
pub mod oci;
pub mod platform;
pub mod registry;
