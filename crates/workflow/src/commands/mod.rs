//! Command handlers, one module per top-level subcommand.

pub mod completion;
pub mod config_cmd;
pub mod repo_cmd;
pub mod version;
