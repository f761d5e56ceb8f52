//! Personal per-repository settings, `~/.workflow/config/repository.toml`.
//!
//! One file holds the settings of every repository the user has configured,
//! keyed by [`crate::identity::RepoIdentity`] ID:
//!
//! ```toml
//! [widgets_1a2b3c4d]
//! auto_accept_change_type = true
//!
//! [widgets_1a2b3c4d.branch]
//! prefix = "alice"
//! ignore = ["release"]
//! ```
//!
//! Because the file is shared, every save re-reads it as a plain TOML table
//! and only replaces the fields being set for one repository ID. Keys this
//! module does not model are written back untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::document::take_table;
use crate::error::Result;
use crate::io::{read_toml, write_toml};

// ---------------------------------------------------------------------------
// Section types
// ---------------------------------------------------------------------------

/// `[<repo-id>.branch]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSettings {
    /// Prefix for new branch names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Branches excluded from cleanup and switching lists, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
}

/// One repository's personal settings.
///
/// Every field is optional. When used as a patch (see
/// [`PrivateConfigStore::save_section`]), `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRepoSection {
    /// Accept the suggested change type without prompting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_accept_change_type: Option<bool>,

    /// Branch settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchSettings>,
}

impl PrivateRepoSection {
    /// An empty section (or a patch that changes nothing).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.branch.get_or_insert_with(BranchSettings::default).prefix = Some(prefix.into());
        self
    }

    pub fn with_ignored_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branch.get_or_insert_with(BranchSettings::default).ignore =
            Some(branches.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_auto_accept_change_type(mut self, value: bool) -> Self {
        self.auto_accept_change_type = Some(value);
        self
    }

    /// `branch.prefix`, if set.
    pub fn branch_prefix(&self) -> Option<&str> {
        self.branch.as_ref()?.prefix.as_deref()
    }

    /// `branch.ignore`, if set.
    pub fn ignored_branches(&self) -> Option<&[String]> {
        self.branch.as_ref()?.ignore.as_deref()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.auto_accept_change_type.is_none()
            && self
                .branch
                .as_ref()
                .is_none_or(|b| b.prefix.is_none() && b.ignore.is_none())
    }
}

/// The whole private file: repository ID to section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateConfig {
    repositories: BTreeMap<String, PrivateRepoSection>,
}

impl PrivateConfig {
    pub fn get(&self, repo_id: &str) -> Option<&PrivateRepoSection> {
        self.repositories.get(repo_id)
    }

    /// Insert or replace a whole section.
    pub fn insert(&mut self, repo_id: impl Into<String>, section: PrivateRepoSection) {
        self.repositories.insert(repo_id.into(), section);
    }

    /// Repository IDs in sorted order.
    pub fn repo_ids(&self) -> impl Iterator<Item = &str> {
        self.repositories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Cache state
// ---------------------------------------------------------------------------

/// Where the cached snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Parsed from the file on disk (or written by this store).
    File,
    /// There was no file.
    Missing,
    /// The file existed but could not be read or parsed; treated as empty.
    Unreadable,
}

#[derive(Debug)]
struct LoadedSnapshot {
    config: PrivateConfig,
    origin: SnapshotOrigin,
}

#[derive(Debug)]
enum CacheState {
    Unloaded,
    Loaded(LoadedSnapshot),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Lazily loaded, cached access to the private file.
#[derive(Debug)]
pub struct PrivateConfigStore {
    path: PathBuf,
    cache: CacheState,
}

impl PrivateConfigStore {
    /// Store for `path`. Nothing is read until first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: CacheState::Unloaded,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been read (or written) by this instance.
    pub fn is_loaded(&self) -> bool {
        matches!(self.cache, CacheState::Loaded(_))
    }

    /// Origin of the cached snapshot, `None` before the first load.
    pub fn origin(&self) -> Option<SnapshotOrigin> {
        match &self.cache {
            CacheState::Loaded(snapshot) => Some(snapshot.origin),
            CacheState::Unloaded => None,
        }
    }

    /// The cached snapshot, reading the file on first call.
    ///
    /// Never fails: a missing or broken file yields an empty snapshot.
    pub fn load(&mut self) -> &PrivateConfig {
        &self.loaded().config
    }

    /// Section for `repo_id` from the cached snapshot.
    pub fn get(&mut self, repo_id: &str) -> Option<&PrivateRepoSection> {
        self.loaded().config.get(repo_id)
    }

    /// Replace a section in memory only.
    pub fn set(&mut self, repo_id: &str, section: PrivateRepoSection) {
        self.loaded().config.insert(repo_id, section);
    }

    /// Merge `patch` into the on-disk section for `repo_id` and write the
    /// file back. Sections of other repositories, fields not set in `patch`
    /// and keys this module does not know are preserved. The cache is
    /// replaced with what was written.
    ///
    /// # Errors
    ///
    /// Unlike [`PrivateConfigStore::load`], an unreadable or malformed file
    /// is an error here: rewriting it would drop other repositories'
    /// settings.
    pub fn save_section(&mut self, repo_id: &str, patch: &PrivateRepoSection) -> Result<()> {
        let mut on_disk = self.read_strict()?;
        apply_section(&mut on_disk, repo_id, patch, FieldMode::Patch);
        self.write(on_disk)
    }

    /// Write every section of `snapshot`, replacing the modeled fields of
    /// same-ID sections on disk. Sections for IDs `snapshot` does not
    /// mention and unknown keys inside replaced sections are kept.
    ///
    /// # Errors
    ///
    /// Same as [`PrivateConfigStore::save_section`].
    pub fn save_all(&mut self, snapshot: &PrivateConfig) -> Result<()> {
        let mut on_disk = self.read_strict()?;
        for (repo_id, section) in &snapshot.repositories {
            apply_section(&mut on_disk, repo_id, section, FieldMode::Replace);
        }
        self.write(on_disk)
    }

    fn loaded(&mut self) -> &mut LoadedSnapshot {
        match self.cache {
            CacheState::Loaded(ref mut snapshot) => snapshot,
            CacheState::Unloaded => {
                self.cache = CacheState::Loaded(read_lenient(&self.path));
                self.loaded()
            }
        }
    }

    fn read_strict(&self) -> Result<Table> {
        Ok(read_toml::<Table>(&self.path)?.unwrap_or_default())
    }

    fn write(&mut self, document: Table) -> Result<()> {
        write_toml(&self.path, &document)?;
        self.cache = CacheState::Loaded(snapshot_from(document));
        Ok(())
    }
}

fn read_lenient(path: &Path) -> LoadedSnapshot {
    match read_toml::<Table>(path) {
        Ok(Some(document)) => snapshot_from(document),
        Ok(None) => LoadedSnapshot {
            config: PrivateConfig::default(),
            origin: SnapshotOrigin::Missing,
        },
        Err(_) => LoadedSnapshot {
            config: PrivateConfig::default(),
            origin: SnapshotOrigin::Unreadable,
        },
    }
}

/// Typed view of a parsed document. A section with a wrongly typed field
/// makes the whole snapshot unreadable, same as a syntax error.
fn snapshot_from(document: Table) -> LoadedSnapshot {
    match Value::Table(document).try_into::<PrivateConfig>() {
        Ok(config) => LoadedSnapshot {
            config,
            origin: SnapshotOrigin::File,
        },
        Err(_) => LoadedSnapshot {
            config: PrivateConfig::default(),
            origin: SnapshotOrigin::Unreadable,
        },
    }
}

// ---------------------------------------------------------------------------
// Field-level document edits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    /// Unset fields leave the stored value alone.
    Patch,
    /// Unset fields remove the stored value.
    Replace,
}

/// Write the modeled fields of `section` into `document[repo_id]`.
///
/// Only `auto_accept_change_type`, `branch.prefix` and `branch.ignore` are
/// touched; every other key in the section survives.
fn apply_section(
    document: &mut Table,
    repo_id: &str,
    section: &PrivateRepoSection,
    mode: FieldMode,
) {
    let mut stored = take_table(document, repo_id);
    put_field(
        &mut stored,
        "auto_accept_change_type",
        section.auto_accept_change_type.map(Value::Boolean),
        mode,
    );

    if section.branch.is_some() || mode == FieldMode::Replace {
        let branch = section.branch.clone().unwrap_or_default();
        let mut stored_branch = take_table(&mut stored, "branch");
        put_field(&mut stored_branch, "prefix", branch.prefix.map(Value::String), mode);
        put_field(
            &mut stored_branch,
            "ignore",
            branch
                .ignore
                .map(|names| Value::Array(names.into_iter().map(Value::String).collect())),
            mode,
        );
        if !stored_branch.is_empty() {
            stored.insert("branch".to_string(), Value::Table(stored_branch));
        }
    }

    document.insert(repo_id.to_string(), Value::Table(stored));
}

fn put_field(table: &mut Table, key: &str, value: Option<Value>, mode: FieldMode) {
    match (value, mode) {
        (Some(value), _) => {
            table.insert(key.to_string(), value);
        }
        (None, FieldMode::Replace) => {
            table.remove(key);
        }
        (None, FieldMode::Patch) => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
