//! Stable repository identity.
//!
//! A repository with an `origin` remote is identified by
//! `{name}_{hash}`, where `name` is the last path segment of the remote URL
//! and `hash` is the first 8 hex characters of the SHA-256 of the URL. Every
//! clone of the same remote on every machine gets the same ID.
//!
//! Without a Git port the identity falls back to `repo_{hash}` over the
//! absolute path. Such IDs only make sense on the machine that produced them.

use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{ConfigError, Result};
use crate::git_port::{GitQueryPort, ORIGIN_REMOTE};

/// Number of hex characters of the digest kept in an ID.
const HASH_LEN: usize = 8;

/// Name used for path-derived IDs and for URLs without a usable path.
const FALLBACK_NAME: &str = "repo";

/// Where a [`RepoIdentity`] was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// Hashed from the `origin` remote URL.
    Remote {
        /// The remote URL, trimmed.
        url: String,
    },
    /// Hashed from the absolute filesystem path.
    Path,
}

/// Stable handle for "this repository".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    id: String,
    source_path: PathBuf,
    source: IdentitySource,
}

impl RepoIdentity {
    /// The derived ID, e.g. `widgets_1a2b3c4d`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The repository root (or directory) the identity was resolved for.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// What the ID was hashed from.
    pub fn source(&self) -> &IdentitySource {
        &self.source
    }

    /// Whether the same ID is produced for other clones on other machines.
    ///
    /// Only remote-derived identities are portable.
    pub fn is_portable(&self) -> bool {
        matches!(self.source, IdentitySource::Remote { .. })
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Resolve the identity of the repository a Git port is bound to.
///
/// With `None`, no Git is consulted and the current directory is hashed
/// (offline mode).
///
/// # Errors
///
/// - [`ConfigError::NotAGitRepository`] if the port's path is not inside a
///   repository.
/// - [`ConfigError::NoRemoteConfigured`] if the repository has no `origin`
///   URL. Falling back to [`path_identity`] is the caller's decision.
/// - [`ConfigError::GitQuery`] if the port itself fails.
pub fn resolve(port: Option<&dyn GitQueryPort>) -> Result<RepoIdentity> {
    match port {
        Some(port) => resolve_with_port(port),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Ok(path_identity(&cwd))
        }
    }
}

fn resolve_with_port(port: &dyn GitQueryPort) -> Result<RepoIdentity> {
    let path = port.repo_path();
    if !port.is_git_repo(&path) {
        return Err(ConfigError::NotAGitRepository { path });
    }

    let repo = port.open(&path).map_err(ConfigError::GitQuery)?;
    let url = repo
        .remote_url(ORIGIN_REMOTE)
        .map_err(ConfigError::GitQuery)?
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ConfigError::NoRemoteConfigured {
            remote: ORIGIN_REMOTE.to_string(),
            path: path.clone(),
        })?;

    Ok(remote_identity(&url, path))
}

/// Identity for a repository whose `origin` is `url`.
pub fn remote_identity(url: &str, source_path: impl Into<PathBuf>) -> RepoIdentity {
    let url = url.trim();
    RepoIdentity {
        id: format!("{}_{}", repo_name_from_url(url), short_hash(url)),
        source_path: source_path.into(),
        source: IdentitySource::Remote {
            url: url.to_string(),
        },
    }
}

/// Identity derived from a filesystem path (`repo_{hash}`).
///
/// Existing paths are canonicalized first; relative paths are made absolute
/// against the current directory.
pub fn path_identity(path: &Path) -> RepoIdentity {
    let absolute = absolutize(path);
    RepoIdentity {
        id: format!(
            "{FALLBACK_NAME}_{}",
            short_hash(&absolute.to_string_lossy())
        ),
        source_path: absolute,
        source: IdentitySource::Path,
    }
}

/// Extract the repository name from a remote URL.
///
/// `git@github.com:acme/widgets.git`, `https://github.com/acme/widgets` and
/// `ssh://git@host:22/acme/widgets.git/` all yield `widgets`.
pub fn repo_name_from_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let path = if let Some((_, rest)) = url.split_once("://") {
        // scheme://[user@]host[:port]/path
        rest.split_once('/').map(|(_, path)| path).unwrap_or("")
    } else if let Some(path) = scp_path(url) {
        path
    } else {
        url
    };

    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// The path part of an SCP-like `[user@]host:path`. Windows drive paths
/// such as `C:\src\widgets` are not SCP URLs.
fn scp_path(url: &str) -> Option<&str> {
    let (host, path) = url.split_once(':')?;
    let is_drive = host.len() == 1 && host.chars().all(|c| c.is_ascii_alphabetic());
    if host.is_empty() || is_drive || host.contains(['/', '\\']) {
        return None;
    }
    Some(path)
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_LEN);
    hex
}

fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
