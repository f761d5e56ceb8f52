//! [`GitQueryPort`] backed by the `git` binary.

use std::path::{Path, PathBuf};

use workflow_config::error::PortError;
use workflow_config::{GitQueryPort, GitRepoHandle};

use crate::commands::{GitError, git_config_get};
use crate::gitdir::{find_git_root, get_git_root_via_command, is_git_repo};

/// A Git port bound to a working directory.
#[derive(Debug, Clone)]
pub struct GitCliPort {
    cwd: PathBuf,
}

impl GitCliPort {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// A port bound to the process's current directory.
    ///
    /// # Errors
    ///
    /// Fails if the current directory cannot be determined.
    pub fn current_dir() -> std::io::Result<Self> {
        std::env::current_dir().map(Self::new)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

impl GitQueryPort for GitCliPort {
    fn repo_path(&self) -> PathBuf {
        get_git_root_via_command(&self.cwd)
            .or_else(|| find_git_root(&self.cwd))
            .unwrap_or_else(|| self.cwd.canonicalize().unwrap_or_else(|_| self.cwd.clone()))
    }

    fn is_git_repo(&self, path: &Path) -> bool {
        is_git_repo(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn GitRepoHandle>, PortError> {
        if !is_git_repo(path) {
            return Err(Box::new(GitError::NotARepo(path.display().to_string())));
        }
        Ok(Box::new(GitCliRepo {
            root: path.to_path_buf(),
        }))
    }
}

/// An opened repository; queries run `git` in its root.
#[derive(Debug, Clone)]
pub struct GitCliRepo {
    root: PathBuf,
}

impl GitCliRepo {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl GitRepoHandle for GitCliRepo {
    fn remote_url(&self, name: &str) -> Result<Option<String>, PortError> {
        git_config_get(&format!("remote.{name}.url"), &self.root)
            .map_err(|err| Box::new(err) as PortError)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
