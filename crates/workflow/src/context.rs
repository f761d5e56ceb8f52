//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds all the state a command handler needs:
//! resolved workflow paths, the loaded global configuration, the working
//! directory and the global flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;
use workflow_config::identity::path_identity;
use workflow_config::{GitQueryPort, GlobalConfigManager, RepoConfigManager, WorkflowPaths};
use workflow_git::GitCliPort;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// User-scoped file locations.
    pub paths: WorkflowPaths,

    /// The user-wide configuration, already loaded.
    pub global_config: GlobalConfigManager,

    /// Directory commands operate on (`-C` or the current directory).
    pub work_dir: PathBuf,

    /// Skip git and identify the repository by path.
    pub offline: bool,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// Loads the global configuration, creating it on first run.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let paths = WorkflowPaths::resolve()?;
        let work_dir = match &global.repo {
            Some(dir) => dir
                .canonicalize()
                .with_context(|| format!("cannot use {} as working directory", dir.display()))?,
            None => std::env::current_dir().context("cannot determine current directory")?,
        };

        let mut global_config = GlobalConfigManager::new(&paths);
        global_config.load()?;

        Ok(Self {
            paths,
            global_config,
            work_dir,
            offline: global.offline,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    /// Default log level when `RUST_LOG` is not set.
    ///
    /// `--verbose` forces `debug`; otherwise the configured `log.level`
    /// applies, capped at `warn` under `--quiet`.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            return LevelFilter::DEBUG;
        }
        let configured = self
            .global_config
            .config()
            .ok()
            .and_then(|config| config.log.level.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::INFO);
        if self.quiet {
            configured.min(LevelFilter::WARN)
        } else {
            configured
        }
    }

    /// Open the configuration of the repository at `work_dir`.
    ///
    /// A repository without an `origin` remote falls back to a path-based
    /// identity with a warning; settings saved under it do not follow the
    /// repository to other clones.
    pub fn repo_manager(&self) -> Result<RepoConfigManager> {
        let mut manager = if self.offline {
            let identity = path_identity(&self.work_dir);
            RepoConfigManager::with_identity(identity, self.work_dir.clone(), &self.paths)
        } else {
            let port = GitCliPort::new(&self.work_dir);
            match RepoConfigManager::new(Some(&port), &self.paths) {
                Ok(manager) => manager,
                Err(err) if err.is_no_remote() => {
                    let root = port.repo_path();
                    let identity = path_identity(&root);
                    warn!(
                        repo = %root.display(),
                        id = identity.id(),
                        "no 'origin' remote; using a path-based repository id"
                    );
                    RepoConfigManager::with_identity(identity, root, &self.paths)
                }
                Err(err) => return Err(err.into()),
            }
        };
        manager.load()?;

        debug!(
            id = manager.repo_id(),
            root = %manager.repo_root().display(),
            public = %manager.public_config_path().display(),
            private = %manager.private_config_path().display(),
            "resolved repository"
        );
        Ok(manager)
    }
}
