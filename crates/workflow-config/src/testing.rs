//! In-memory [`GitQueryPort`] for tests.
//!
//! Lets identity and manager behavior be exercised without a `git` binary
//! or a real repository on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PortError;
use crate::git_port::{GitQueryPort, GitRepoHandle};

/// A scripted Git Query Port.
///
/// ```
/// use workflow_config::testing::FakeGitPort;
/// use workflow_config::identity::resolve;
///
/// let port = FakeGitPort::repo("/src/widgets")
///     .with_remote("origin", "git@github.com:acme/widgets.git");
/// let identity = resolve(Some(&port)).unwrap();
/// assert!(identity.id().starts_with("widgets_"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeGitPort {
    root: PathBuf,
    is_repo: bool,
    remotes: HashMap<String, String>,
    open_error: Option<String>,
}

impl FakeGitPort {
    /// A repository rooted at `root` with no remotes.
    pub fn repo(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            is_repo: true,
            ..Self::default()
        }
    }

    /// A plain directory that is not inside any repository.
    pub fn not_a_repo(path: impl Into<PathBuf>) -> Self {
        Self {
            root: path.into(),
            is_repo: false,
            ..Self::default()
        }
    }

    /// Add (or replace) a remote.
    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.insert(name.to_string(), url.to_string());
        self
    }

    /// Make [`GitQueryPort::open`] fail with `message`.
    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }
}

impl GitQueryPort for FakeGitPort {
    fn repo_path(&self) -> PathBuf {
        self.root.clone()
    }

    fn is_git_repo(&self, path: &Path) -> bool {
        self.is_repo && path.starts_with(&self.root)
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn GitRepoHandle>, PortError> {
        if let Some(message) = &self.open_error {
            return Err(message.clone().into());
        }
        Ok(Box::new(FakeRepoHandle {
            remotes: self.remotes.clone(),
        }))
    }
}

#[derive(Debug)]
struct FakeRepoHandle {
    remotes: HashMap<String, String>,
}

impl GitRepoHandle for FakeRepoHandle {
    fn remote_url(&self, name: &str) -> Result<Option<String>, PortError> {
        Ok(self.remotes.get(name).cloned())
    }
}
