//! Configuration management for the workflow tool.
//!
//! This crate resolves a stable identity for the current repository and
//! manages the three configuration files keyed around it:
//!
//! - `<repo-root>/.workflow/config.toml`, committed and shared by the team
//!   (templates),
//! - `~/.workflow/config/repository.toml`, private per-user settings keyed
//!   by repository ID,
//! - `~/.workflow/config.toml`, user-wide settings.
//!
//! Git is reached only through the [`GitQueryPort`] trait; this crate does
//! not depend on any Git implementation.

pub mod error;
pub mod git_port;
pub mod global;
pub mod identity;
pub mod paths;
pub mod private;
pub mod public;
pub mod repo;
pub mod testing;

mod document;
mod io;

pub use error::{ConfigError, Result};
pub use git_port::{GitQueryPort, GitRepoHandle};
pub use global::{GlobalConfig, GlobalConfigManager};
pub use identity::RepoIdentity;
pub use paths::WorkflowPaths;
pub use private::PrivateRepoSection;
pub use public::TemplateConfig;
pub use repo::RepoConfigManager;
