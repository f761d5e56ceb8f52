//! Clap CLI definitions for the `workflow` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// workflow -- repository-aware developer workflow settings.
#[derive(Parser, Debug)]
#[command(
    name = "workflow",
    about = "Repository-aware developer workflow settings",
    long_about = "Resolves a stable identity for the current repository and manages \
                  shared templates, personal per-repository settings and user-wide configuration.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Run as if started in PATH.
    #[arg(short = 'C', long = "repo", value_name = "PATH", global = true)]
    pub repo: Option<PathBuf>,

    /// Do not consult git; identify the repository by its path.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and configure the current repository.
    Repo(RepoArgs),

    /// Manage user-wide configuration (~/.workflow/config.toml).
    Config(ConfigArgs),

    /// Print version information.
    Version,

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------
// Repo
// ---------------------------------------------------------------------------

/// Arguments for `workflow repo`.
#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommands,
}

/// Repo subcommands.
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Print the repository ID.
    Id,
    /// Show identity, config file locations and effective settings.
    Show,
    /// Save personal settings for this repository.
    Set(RepoSetArgs),
    /// Save shared templates to the project config file.
    Template(RepoTemplateArgs),
}

/// Arguments for `workflow repo set`.
#[derive(Args, Debug)]
pub struct RepoSetArgs {
    /// Prefix for new branch names.
    #[arg(long, value_name = "PREFIX")]
    pub branch_prefix: Option<String>,

    /// Branch to ignore (repeatable). Replaces the saved list.
    #[arg(long = "ignore", value_name = "BRANCH")]
    pub ignore: Vec<String>,

    /// Save an empty ignore list.
    #[arg(long, conflicts_with = "ignore")]
    pub clear_ignore: bool,

    /// Accept the suggested change type without prompting.
    #[arg(long, value_name = "BOOL")]
    pub auto_accept_change_type: Option<bool>,
}

/// Arguments for `workflow repo template`.
#[derive(Args, Debug)]
pub struct RepoTemplateArgs {
    /// Default commit message template.
    #[arg(long, value_name = "TEMPLATE")]
    pub commit_default: Option<String>,

    /// Whether commit messages ask for a scope.
    #[arg(long, value_name = "BOOL")]
    pub use_scope: Option<bool>,

    /// Default branch name template.
    #[arg(long, value_name = "TEMPLATE")]
    pub branch_default: Option<String>,

    /// Default pull request body template.
    #[arg(long, value_name = "TEMPLATE")]
    pub pr_default: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Arguments for `workflow config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value by dotted key (e.g. `log.level`).
    Get(ConfigGetArgs),
    /// Set a configuration value and save the file.
    Set(ConfigSetArgs),
    /// Show the configuration file.
    Show(ConfigShowArgs),
    /// Print the configuration file path.
    Path,
}

/// Arguments for `workflow config get`.
#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Dotted configuration key.
    pub key: String,
}

/// Arguments for `workflow config set`.
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Dotted configuration key.
    pub key: String,
    /// Value, parsed as a TOML scalar when possible and as a string otherwise.
    pub value: String,
}

/// Arguments for `workflow config show`.
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Show the effective settings after defaults and WORKFLOW_* overrides.
    #[arg(long)]
    pub effective: bool,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `workflow completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
