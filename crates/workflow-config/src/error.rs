//! Error types for configuration and identity resolution.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type produced by a Git Query Port implementation.
///
/// Adapters wrap whatever their backend reports; the core only forwards it.
pub type PortError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving identity or reading/writing config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The Git Query Port reported that the path is not inside a repository.
    #[error("not a git repository: {}", path.display())]
    NotAGitRepository {
        /// The path the port was asked about.
        path: PathBuf,
    },

    /// The repository has no usable URL for the requested remote.
    #[error("no '{remote}' remote configured for repository at {}", path.display())]
    NoRemoteConfigured {
        /// Name of the remote that was looked up (normally `origin`).
        remote: String,
        /// Repository root.
        path: PathBuf,
    },

    /// The Git Query Port failed while opening the repository or querying it.
    #[error("git query failed: {0}")]
    GitQuery(#[source] PortError),

    /// A configuration file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ReadError {
        /// The file that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file contained invalid TOML.
    #[error("failed to parse config file {}: {source}", path.display())]
    ParseError {
        /// The file that was being parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A configuration file (or its directory) could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    WriteError {
        /// The file that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The layered global configuration could not be extracted.
    #[error("invalid global configuration: {0}")]
    Extract(Box<figment::Error>),

    /// The user's home directory could not be determined.
    #[error("home directory not found: set HOME or WORKFLOW_HOME")]
    HomeNotFound,

    /// A dotted configuration key was malformed or points through a value.
    #[error("invalid configuration key '{key}': {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// A description of why the key is invalid.
        reason: String,
    },

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    // -- Constructors --------------------------------------------------------

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: toml::de::Error) -> Self {
        Self::ParseError {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` for errors that prevent a repository identity from
    /// being resolved.
    pub fn is_identity_error(&self) -> bool {
        matches!(
            self,
            Self::NotAGitRepository { .. } | Self::NoRemoteConfigured { .. } | Self::GitQuery(_)
        )
    }

    /// Returns `true` if this is a [`ConfigError::NoRemoteConfigured`].
    pub fn is_no_remote(&self) -> bool {
        matches!(self, Self::NoRemoteConfigured { .. })
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}
