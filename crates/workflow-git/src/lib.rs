//! Git adapter for the workflow configuration core.
//!
//! Implements [`workflow_config::GitQueryPort`] by shelling out to the
//! `git` binary, plus the repository discovery helpers it is built on.

pub mod commands;
pub mod gitdir;
pub mod port;

pub use commands::GitError;
pub use port::{GitCliPort, GitCliRepo};
