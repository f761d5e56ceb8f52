//! Locations of the workflow configuration files.
//!
//! User-scoped files live under `~/.workflow/` (overridable with the
//! `WORKFLOW_HOME` environment variable); the project-shared file lives
//! under `<repo-root>/.workflow/`.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// The name of the workflow metadata directory, both in `$HOME` and in a
/// repository root.
pub const WORKFLOW_DIR_NAME: &str = ".workflow";

/// The name of the environment variable that overrides `~/.workflow`.
pub const WORKFLOW_HOME_ENV: &str = "WORKFLOW_HOME";

/// File name shared by the global and the project config.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Private per-repository settings, relative to the workflow home.
const PRIVATE_CONFIG_RELATIVE: &[&str] = &["config", "repository.toml"];

/// Resolved user-scoped locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPaths {
    home: PathBuf,
}

impl WorkflowPaths {
    /// Resolve the workflow home from `WORKFLOW_HOME` or the user's home
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeNotFound`] if neither is available.
    pub fn resolve() -> Result<Self> {
        if let Ok(dir) = std::env::var(WORKFLOW_HOME_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::at(dir));
            }
        }

        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(Self::at(home.join(WORKFLOW_DIR_NAME)))
    }

    /// Use an explicit workflow home directory (the equivalent of
    /// `~/.workflow`).
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The workflow home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `~/.workflow/config.toml`.
    pub fn global_config(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }

    /// `~/.workflow/config/repository.toml`.
    pub fn private_config(&self) -> PathBuf {
        PRIVATE_CONFIG_RELATIVE
            .iter()
            .fold(self.home.clone(), |path, part| path.join(part))
    }
}

/// `<repo-root>/.workflow/config.toml`.
pub fn public_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(WORKFLOW_DIR_NAME).join(CONFIG_FILE_NAME)
}
