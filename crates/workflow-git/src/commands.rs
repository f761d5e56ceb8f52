//! Running `git` for repository queries.
//!
//! The adapter needs only two answers from Git: the top-level directory of
//! a working tree and the value of a `remote.<name>.url` setting. Both are
//! read from the output of short-lived `git` processes.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Exit status of `git config --get` when the key is not set.
const CONFIG_KEY_MISSING: i32 = 1;

/// Failure to get an answer out of `git`.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` is not installed, or the working directory does not exist.
    #[error("failed to execute git: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("git command failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// `None` when git was killed by a signal.
        code: Option<i32>,
        stderr: String,
    },

    /// Raised by the port when asked to open a directory outside any
    /// working tree.
    #[error("not a git repository: {0}")]
    NotARepo(String),
}

impl GitError {
    /// Whether git exited with `code`.
    pub fn exited_with(&self, code: i32) -> bool {
        matches!(self, Self::CommandFailed { code: Some(c), .. } if *c == code)
    }
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Run `git <args>` in `cwd` and return its trimmed stdout.
///
/// # Errors
///
/// [`GitError::SpawnError`] when the process cannot start and
/// [`GitError::CommandFailed`] on a non-zero exit, carrying git's stderr.
pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    debug!(?args, cwd = %cwd.display(), "running git");
    let output = Command::new("git").args(args).current_dir(cwd).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(code = ?output.status.code(), %stderr, "git failed");
        return Err(GitError::CommandFailed {
            code: output.status.code(),
            stderr,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Value of a single config key as seen from `cwd`, such as
/// `remote.origin.url`.
///
/// An unset or empty key is `Ok(None)`; only real failures are errors.
///
/// ```no_run
/// use std::path::Path;
/// use workflow_git::commands::git_config_get;
///
/// if let Some(url) = git_config_get("remote.origin.url", Path::new(".")).unwrap() {
///     println!("origin is {url}");
/// }
/// ```
pub fn git_config_get(key: &str, cwd: &Path) -> Result<Option<String>> {
    match git_command(&["config", "--get", key], cwd) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(err) if err.exited_with(CONFIG_KEY_MISSING) => Ok(None),
        Err(err) => Err(err),
    }
}
