//! The narrow Git capability the configuration core depends on.
//!
//! The core never talks to a Git implementation directly. Callers hand it
//! something implementing [`GitQueryPort`]: the `workflow-git` adapter in
//! production, [`crate::testing::FakeGitPort`] in tests.

use std::path::{Path, PathBuf};

use crate::error::PortError;

/// Name of the remote whose URL defines a repository's identity.
pub const ORIGIN_REMOTE: &str = "origin";

/// Repository queries needed for identity resolution.
pub trait GitQueryPort {
    /// The path this port is bound to: the repository root when inside a
    /// repository, otherwise the directory the port was created for.
    fn repo_path(&self) -> PathBuf;

    /// Whether `path` is inside a Git repository.
    fn is_git_repo(&self, path: &Path) -> bool;

    /// Open the repository containing `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn GitRepoHandle>, PortError>;
}

/// An opened repository.
pub trait GitRepoHandle {
    /// The URL configured for remote `name`, or `None` if the remote does
    /// not exist.
    fn remote_url(&self, name: &str) -> Result<Option<String>, PortError>;
}
