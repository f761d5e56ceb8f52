//! The project-shared configuration file, `<repo-root>/.workflow/config.toml`.
//!
//! This file is meant to be committed. The tool only ever writes its
//! `[template]` section; everything else in the file belongs to the team and
//! is carried through saves untouched.
//!
//! ```toml
//! [template.commit]
//! default = "{{type}}({{scope}}): {{subject}}"
//! use_scope = true
//!
//! [template.branch]
//! default = "{{prefix}}/{{ticket}}-{{slug}}"
//!
//! [template.pull_requests]
//! default = "## Summary\n{{body}}"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::document::{get_table, take_table};
use crate::error::Result;
use crate::io::{read_toml, write_toml};
use crate::paths::public_config_path;

const TEMPLATE_KEY: &str = "template";
const COMMIT_KEY: &str = "commit";
const BRANCH_KEY: &str = "branch";
const PULL_REQUESTS_KEY: &str = "pull_requests";

/// Key of the template used when no other template is selected.
pub const DEFAULT_TEMPLATE_KEY: &str = "default";

/// Commit template flag controlling whether a scope is prompted for.
pub const USE_SCOPE_KEY: &str = "use_scope";

// ---------------------------------------------------------------------------
// Template types
// ---------------------------------------------------------------------------

/// A free-form set of named templates and template options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet(Table);

impl TemplateSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`TemplateSet::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a key, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`; `None` if missing or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean value for `key`; `None` if missing or not a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// The `default` template string.
    pub fn default_template(&self) -> Option<&str> {
        self.get_str(DEFAULT_TEMPLATE_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn from_section(template: Option<&Table>, key: &str) -> Self {
        Self(
            template
                .and_then(|t| get_table(t, key))
                .cloned()
                .unwrap_or_default(),
        )
    }
}

/// The `[template]` section: commit, branch and pull-request templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// `[template.commit]`.
    #[serde(default)]
    pub commit: TemplateSet,

    /// `[template.branch]`.
    #[serde(default)]
    pub branch: TemplateSet,

    /// `[template.pull_requests]`.
    #[serde(default)]
    pub pull_requests: TemplateSet,
}

impl TemplateConfig {
    /// Whether commit messages should include a scope. Defaults to `false`.
    pub fn use_scope(&self) -> bool {
        self.commit.get_bool(USE_SCOPE_KEY).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.commit.is_empty() && self.branch.is_empty() && self.pull_requests.is_empty()
    }

    fn sections(&self) -> [(&'static str, &TemplateSet); 3] {
        [
            (COMMIT_KEY, &self.commit),
            (BRANCH_KEY, &self.branch),
            (PULL_REQUESTS_KEY, &self.pull_requests),
        ]
    }
}

/// Team-wide branch defaults from a hand-written `[branch]` section.
///
/// Read-only: the tool never writes this section. Personal settings in the
/// private file take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedBranchDefaults {
    /// `branch.prefix`.
    pub prefix: Option<String>,
    /// `branch.ignore`.
    pub ignore: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Reads and writes the project-shared config file.
#[derive(Debug, Clone)]
pub struct PublicConfigStore {
    path: PathBuf,
    document: Table,
    exists: bool,
}

impl PublicConfigStore {
    /// Store for the repository rooted at `repo_root`. Nothing is read until
    /// [`PublicConfigStore::load`].
    pub fn for_repo(repo_root: &Path) -> Self {
        Self::at(public_config_path(repo_root))
    }

    /// Store for an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Table::new(),
            exists: false,
        }
    }

    /// The config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file existed at the last load or save.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// (Re)read the file. A missing file is not an error and loads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::ReadError`] or
    /// [`crate::ConfigError::ParseError`] if the file exists but is unusable.
    pub fn load(&mut self) -> Result<()> {
        match read_toml::<Table>(&self.path)? {
            Some(document) => {
                self.document = document;
                self.exists = true;
            }
            None => {
                self.document = Table::new();
                self.exists = false;
            }
        }
        Ok(())
    }

    /// Templates from the last loaded state. Sub-sections that are missing
    /// or not tables come back empty.
    pub fn templates(&self) -> TemplateConfig {
        let template = get_table(&self.document, TEMPLATE_KEY);
        TemplateConfig {
            commit: TemplateSet::from_section(template, COMMIT_KEY),
            branch: TemplateSet::from_section(template, BRANCH_KEY),
            pull_requests: TemplateSet::from_section(template, PULL_REQUESTS_KEY),
        }
    }

    /// Team branch defaults from the last loaded state.
    pub fn shared_branch_defaults(&self) -> SharedBranchDefaults {
        let Some(branch) = get_table(&self.document, BRANCH_KEY) else {
            return SharedBranchDefaults::default();
        };
        SharedBranchDefaults {
            prefix: branch.get("prefix").and_then(Value::as_str).map(str::to_string),
            ignore: branch.get("ignore").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        }
    }

    /// Merge `templates` into the file's `[template]` section and write the
    /// whole file back.
    ///
    /// The file is re-read first so edits made since the last load survive.
    /// Keys set in `templates` overwrite same-named keys; other template keys
    /// and all other top-level sections are kept.
    ///
    /// # Errors
    ///
    /// Fails if the existing file cannot be read or parsed, or if the file
    /// or its directory cannot be written.
    pub fn save_templates(&mut self, templates: &TemplateConfig) -> Result<()> {
        let mut document = read_toml::<Table>(&self.path)?.unwrap_or_default();

        let mut template = take_table(&mut document, TEMPLATE_KEY);
        for (key, set) in templates.sections() {
            let mut section = take_table(&mut template, key);
            section.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
            if !section.is_empty() {
                template.insert(key.to_string(), Value::Table(section));
            }
        }
        document.insert(TEMPLATE_KEY.to_string(), Value::Table(template));

        write_toml(&self.path, &document)?;
        self.document = document;
        self.exists = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &Path) -> PublicConfigStore {
        PublicConfigStore::for_repo(dir)
    }

    fn sample_templates() -> TemplateConfig {
        TemplateConfig {
            commit: TemplateSet::new()
                .with(DEFAULT_TEMPLATE_KEY, "{{type}}: {{subject}}")
                .with(USE_SCOPE_KEY, true),
            branch: TemplateSet::new().with(DEFAULT_TEMPLATE_KEY, "{{prefix}}/{{slug}}"),
            pull_requests: TemplateSet::new().with(DEFAULT_TEMPLATE_KEY, "## Summary"),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.load().unwrap();
        assert!(!store.exists());
        assert!(store.templates().is_empty());
        assert!(!store.templates().use_scope());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.save_templates(&sample_templates()).unwrap();
        assert!(dir.path().join(".workflow").join("config.toml").is_file());

        let mut reloaded = store_in(dir.path());
        reloaded.load().unwrap();
        assert!(reloaded.exists());
        assert_eq!(reloaded.templates(), sample_templates());
        assert!(reloaded.templates().use_scope());
    }

    #[test]
    fn save_preserves_other_sections_and_template_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = public_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"
# team settings
[jira]
project = "WID"

[template.commit]
default = "old"
conventional = "{{type}}!: {{subject}}"
"#,
        )
        .unwrap();

        let mut store = PublicConfigStore::at(&path);
        store.load().unwrap();
        store.save_templates(&sample_templates()).unwrap();

        let mut reloaded = PublicConfigStore::at(&path);
        reloaded.load().unwrap();
        let templates = reloaded.templates();
        assert_eq!(templates.commit.default_template(), Some("{{type}}: {{subject}}"));
        assert_eq!(
            templates.commit.get_str("conventional"),
            Some("{{type}}!: {{subject}}")
        );
        assert_eq!(templates.branch, sample_templates().branch);

        let raw: Table = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            get_table(&raw, "jira").and_then(|j| j.get("project")).and_then(Value::as_str),
            Some("WID")
        );
    }

    #[test]
    fn save_rereads_file_changed_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = public_config_path(dir.path());
        let mut store = PublicConfigStore::at(&path);
        store.load().unwrap();

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[github]\norg = \"acme\"\n").unwrap();

        store.save_templates(&sample_templates()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("org = \"acme\""), "{content}");
    }

    #[test]
    fn empty_sets_do_not_create_sections() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        let only_commit = TemplateConfig {
            commit: TemplateSet::new().with(DEFAULT_TEMPLATE_KEY, "c"),
            ..TemplateConfig::default()
        };
        store.save_templates(&only_commit).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(!content.contains("pull_requests"), "{content}");
    }

    #[test]
    fn load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.save_templates(&sample_templates()).unwrap();

        store.load().unwrap();
        let first = store.templates();
        store.load().unwrap();
        assert_eq!(store.templates(), first);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = public_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[template\n").unwrap();

        let mut store = PublicConfigStore::at(&path);
        assert!(matches!(store.load(), Err(ConfigError::ParseError { .. })));
        assert!(matches!(
            store.save_templates(&sample_templates()),
            Err(ConfigError::ParseError { .. })
        ));
        // The broken file is left for the team to fix.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[template\n");
    }

    #[test]
    fn non_table_template_sections_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = public_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[template]\ncommit = \"oops\"\n").unwrap();

        let mut store = PublicConfigStore::at(&path);
        store.load().unwrap();
        assert!(store.templates().commit.is_empty());
    }

    #[test]
    fn shared_branch_defaults_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = public_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[branch]\nprefix = \"team\"\nignore = [\"main\", 3]\n").unwrap();

        let mut store = PublicConfigStore::at(&path);
        store.load().unwrap();
        assert_eq!(
            store.shared_branch_defaults(),
            SharedBranchDefaults {
                prefix: Some("team".into()),
                ignore: Some(vec!["main".into()]),
            }
        );
    }
}
