//! Git repository discovery.
//!
//! Finds the repository root either by asking `git` or by walking up the
//! filesystem looking for `.git`.

use std::path::{Path, PathBuf};

use crate::commands::git_command;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk up the directory tree from `start` looking for a `.git` directory
/// (or `.git` file, as used by git worktrees).
///
/// Returns the repository root directory (the parent of `.git`), or `None`
/// if the filesystem root is reached without finding one.
///
/// This does **not** shell out to `git`. For an answer that respects
/// worktrees and submodules, use [`get_git_root_via_command`].
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Check whether `path` is inside a git repository.
pub fn is_git_repo(path: &Path) -> bool {
    find_git_root(path).is_some()
}

/// Get the repository root using `git rev-parse --show-toplevel`.
///
/// Returns `None` if `git` is not available or the path is not in a repo.
pub fn get_git_root_via_command(cwd: &Path) -> Option<PathBuf> {
    git_command(&["rev-parse", "--show-toplevel"], cwd)
        .ok()
        .filter(|output| !output.is_empty())
        .map(|output| PathBuf::from(normalize_git_path(&output)))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Normalize git paths for Windows compatibility.
///
/// Git on Windows may return MSYS-style paths like `/c/Users/...` or
/// forward-slash paths like `C:/Users/...`.
fn normalize_git_path(path: &str) -> String {
    if std::path::MAIN_SEPARATOR != '\\' {
        return path.to_string();
    }

    let path = path.trim();
    let bytes = path.as_bytes();

    // /c/Users/... -> C:\Users\...
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b'/' && bytes[1].is_ascii_alphabetic() {
        let drive = bytes[1].to_ascii_uppercase() as char;
        return format!("{drive}:{}", path[2..].replace('/', "\\"));
    }

    path.replace('/', "\\")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
