//! Error types for hubcat.
//!
//! Every registry call site has its own variant so callers can attribute a
//! failure to the repository, tag and HTTP status that produced it. None of
//! these errors are retried inside the library.

use thiserror::Error;


/// Main error type for hubcat operations
#[derive(Error, Debug)]
pub enum HubcatError {
    /// The token service refused to issue a pull token, or returned no token.
    #[error("Authentication failed for {repository} (status: {status_code:?}): {message}")]
    Authentication {
        repository: String,
        status_code: Option<u16>,
        message: String,
    },

    /// The hub tag listing endpoint returned a non-200 status.
    #[error("Failed to fetch tags for {repository} (status: {status_code})")]
    TagFetch {
        repository: String,
        status_code: u16,
    },

    /// The manifest endpoint returned a non-200 status.
    #[error("Failed to fetch manifest for {repository}:{tag} at {url} (status: {status_code}): {body}")]
    ManifestFetch {
        repository: String,
        tag: String,
        url: String,
        status_code: u16,
        body: String,
    },

    /// A manifest index did not contain exactly one entry for this platform.
    #[error(
        "Unexpected number of manifests for current platform in {repository}:{tag}: {candidates}"
    )]
    AmbiguousManifest {
        repository: String,
        tag: String,
        candidates: usize,
    },

    /// The host machine has no registry architecture mapping.
    #[error("Unsupported host architecture: {machine}")]
    UnsupportedArchitecture { machine: String },

    /// The blob endpoint returned a non-200 status.
    #[error("Failed to fetch blob {digest} from {repository} (status: {status_code})")]
    BlobFetch {
        repository: String,
        digest: String,
        status_code: u16,
    },

    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors (malformed documents, empty inputs)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for hubcat operations
pub type Result<T> = std::result::Result<T, HubcatError>;

impl HubcatError {
    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::error::HubcatError;
    ///
    /// let err = HubcatError::authentication("org/image", Some(401), "token request rejected");
    /// assert!(matches!(err, HubcatError::Authentication { .. }));
    /// ```
    pub fn authentication<R, S>(repository: R, status_code: Option<u16>, message: S) -> Self
    where
        R: Into<String>,
        S: Into<String>,
    {
        Self::Authentication {
            repository: repository.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new tag fetch error.
    pub fn tag_fetch<R: Into<String>>(repository: R, status_code: u16) -> Self {
        Self::TagFetch {
            repository: repository.into(),
            status_code,
        }
    }

    /// Creates a new manifest fetch error.
    pub fn manifest_fetch(
        repository: impl Into<String>,
        tag: impl Into<String>,
        url: impl Into<String>,
        status_code: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::ManifestFetch {
            repository: repository.into(),
            tag: tag.into(),
            url: url.into(),
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new ambiguous manifest error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::error::HubcatError;
    ///
    /// let err = HubcatError::ambiguous_manifest("org/image", "1.0", 2);
    /// assert!(err.to_string().contains("org/image:1.0"));
    /// ```
    pub fn ambiguous_manifest(
        repository: impl Into<String>,
        tag: impl Into<String>,
        candidates: usize,
    ) -> Self {
        Self::AmbiguousManifest {
            repository: repository.into(),
            tag: tag.into(),
            candidates,
        }
    }

    /// Creates a new unsupported architecture error.
    pub fn unsupported_architecture<S: Into<String>>(machine: S) -> Self {
        Self::UnsupportedArchitecture {
            machine: machine.into(),
        }
    }

    /// Creates a new blob fetch error.
    pub fn blob_fetch(
        repository: impl Into<String>,
        digest: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::BlobFetch {
            repository: repository.into(),
            digest: digest.into(),
            status_code,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::error::HubcatError;
    ///
    /// let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    /// let err = HubcatError::validation_with_source("invalid manifest", json_err);
    /// assert!(matches!(err, HubcatError::Validation { .. }));
    /// ```
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the HTTP status code carried by this error, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use libhubcat::error::HubcatError;
    ///
    /// assert_eq!(HubcatError::tag_fetch("org/image", 404).status_code(), Some(404));
    /// assert_eq!(HubcatError::validation("empty path").status_code(), None);
    /// ```
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } => *status_code,
            Self::TagFetch { status_code, .. }
            | Self::ManifestFetch { status_code, .. }
            | Self::BlobFetch { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for HubcatError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_with_source("Failed to build configuration", None, err)
    }
}
