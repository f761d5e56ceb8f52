//! Per-repository configuration: identity plus the public and private files.
//!
//! [`RepoConfigManager`] resolves the repository identity once at
//! construction, loads the public file on [`RepoConfigManager::load`] and
//! reads the private file only when a personal setting is first asked for.
//!
//! Ownership of each field is fixed. Templates are written to the public
//! file, personal settings to the private file, and no save touches the
//! other file.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git_port::GitQueryPort;
use crate::identity::{self, RepoIdentity};
use crate::paths::WorkflowPaths;
use crate::private::{PrivateConfigStore, PrivateRepoSection};
use crate::public::{PublicConfigStore, TemplateConfig};

/// Unified view of one repository's configuration.
#[derive(Debug)]
pub struct RepoConfigManager {
    identity: RepoIdentity,
    repo_root: PathBuf,
    public: PublicConfigStore,
    private: PrivateConfigStore,
}

impl RepoConfigManager {
    /// Resolve the repository identity through `port` and set up both stores.
    ///
    /// With `port == None` the identity is derived from the current
    /// directory, which is also used as the repository root.
    ///
    /// # Errors
    ///
    /// Identity errors from [`identity::resolve`] are returned unchanged; in
    /// particular a repository without `origin` yields
    /// [`crate::ConfigError::NoRemoteConfigured`] rather than a path-based
    /// identity.
    pub fn new(port: Option<&dyn GitQueryPort>, paths: &WorkflowPaths) -> Result<Self> {
        let identity = identity::resolve(port)?;
        let repo_root = identity.source_path().to_path_buf();
        Ok(Self::with_identity(identity, repo_root, paths))
    }

    /// Build a manager for an identity the caller has already decided on.
    pub fn with_identity(identity: RepoIdentity, repo_root: PathBuf, paths: &WorkflowPaths) -> Self {
        Self {
            public: PublicConfigStore::for_repo(&repo_root),
            private: PrivateConfigStore::new(paths.private_config()),
            identity,
            repo_root,
        }
    }

    /// Load the public file. The private file stays unread until needed.
    ///
    /// # Errors
    ///
    /// Fails if the public file exists but cannot be read or parsed.
    pub fn load(&mut self) -> Result<()> {
        self.public.load()
    }

    pub fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    pub fn repo_id(&self) -> &str {
        self.identity.id()
    }

    /// Directory holding the project's `.workflow/config.toml`.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn public_config_path(&self) -> &Path {
        self.public.path()
    }

    pub fn private_config_path(&self) -> &Path {
        self.private.path()
    }

    /// The private store, for diagnostics.
    pub fn private_store(&self) -> &PrivateConfigStore {
        &self.private
    }

    // -- Personal settings ---------------------------------------------------

    /// Branch prefix: private setting, else the team default, else `""`.
    pub fn branch_prefix(&mut self) -> String {
        if let Some(prefix) = self.private_section().and_then(PrivateRepoSection::branch_prefix) {
            return prefix.to_string();
        }
        self.public
            .shared_branch_defaults()
            .prefix
            .unwrap_or_default()
    }

    /// Ignored branches: private setting, else the team default, else empty.
    pub fn ignored_branches(&mut self) -> Vec<String> {
        if let Some(ignore) = self.private_section().and_then(PrivateRepoSection::ignored_branches) {
            return ignore.to_vec();
        }
        self.public
            .shared_branch_defaults()
            .ignore
            .unwrap_or_default()
    }

    /// Whether the suggested change type is accepted without prompting.
    /// Defaults to `false`.
    pub fn auto_accept_change_type(&mut self) -> bool {
        self.private_section()
            .and_then(|section| section.auto_accept_change_type)
            .unwrap_or(false)
    }

    /// Apply `patch` to this repository's private section and save.
    ///
    /// # Errors
    ///
    /// Fails if the private file is malformed or cannot be written.
    pub fn save_private_section(&mut self, patch: &PrivateRepoSection) -> Result<()> {
        self.private.save_section(self.identity.id(), patch)
    }

    // -- Templates -----------------------------------------------------------

    /// Templates as of the last [`RepoConfigManager::load`] or save.
    pub fn template_config(&self) -> TemplateConfig {
        self.public.templates()
    }

    /// Merge `templates` into the public file and save.
    ///
    /// # Errors
    ///
    /// Fails if the public file is malformed or cannot be written.
    pub fn save_template_config(&mut self, templates: &TemplateConfig) -> Result<()> {
        self.public.save_templates(templates)
    }

    fn private_section(&mut self) -> Option<&PrivateRepoSection> {
        self.private.get(self.identity.id())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::identity::remote_identity;
    use crate::private::SnapshotOrigin;
    use crate::public::{DEFAULT_TEMPLATE_KEY, TemplateSet, USE_SCOPE_KEY};
    use crate::testing::FakeGitPort;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const URL: &str = "git@github.com:acme/widgets.git";

    struct Fixture {
        home: TempDir,
        repo: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                home: tempfile::tempdir().unwrap(),
                repo: tempfile::tempdir().unwrap(),
            }
        }

        fn paths(&self) -> WorkflowPaths {
            WorkflowPaths::at(self.home.path())
        }

        fn port(&self) -> FakeGitPort {
            FakeGitPort::repo(self.repo.path()).with_remote("origin", URL)
        }

        fn manager(&self) -> RepoConfigManager {
            let port = self.port();
            let mut manager = RepoConfigManager::new(Some(&port), &self.paths()).unwrap();
            manager.load().unwrap();
            manager
        }

        fn write_private(&self, content: &str) {
            let path = self.paths().private_config();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn write_public(&self, content: &str) {
            let path = crate::paths::public_config_path(self.repo.path());
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn identity_and_paths() {
        let fx = Fixture::new();
        let manager = fx.manager();
        assert!(manager.repo_id().starts_with("widgets_"));
        assert_eq!(manager.repo_id(), remote_identity(URL, "/elsewhere").id());
        assert_eq!(manager.repo_root(), fx.repo.path());
        assert_eq!(
            manager.public_config_path(),
            fx.repo.path().join(".workflow").join("config.toml")
        );
        assert_eq!(manager.private_config_path(), fx.paths().private_config());
    }

    #[test]
    fn absence_defaults() {
        let fx = Fixture::new();
        let mut manager = fx.manager();
        assert_eq!(manager.branch_prefix(), "");
        assert_eq!(manager.ignored_branches(), Vec::<String>::new());
        assert!(!manager.auto_accept_change_type());
        assert!(manager.template_config().is_empty());
    }

    #[test]
    fn private_store_loads_lazily() {
        let fx = Fixture::new();
        let mut manager = fx.manager();
        assert!(!manager.private_store().is_loaded());

        let _ = manager.template_config();
        assert!(!manager.private_store().is_loaded());

        let _ = manager.branch_prefix();
        assert!(manager.private_store().is_loaded());
        assert_eq!(manager.private_store().origin(), Some(SnapshotOrigin::Missing));
    }

    #[test]
    fn no_remote_is_surfaced() {
        let fx = Fixture::new();
        let port = FakeGitPort::repo(fx.repo.path());
        let err = RepoConfigManager::new(Some(&port), &fx.paths()).unwrap_err();
        assert!(matches!(err, ConfigError::NoRemoteConfigured { .. }), "{err:?}");
    }

    #[test]
    fn caller_chosen_path_identity() {
        let fx = Fixture::new();
        let identity = crate::identity::path_identity(fx.repo.path());
        let mut manager =
            RepoConfigManager::with_identity(identity, fx.repo.path().to_path_buf(), &fx.paths());
        manager.load().unwrap();
        assert!(manager.repo_id().starts_with("repo_"));
        assert!(!manager.identity().is_portable());

        manager
            .save_private_section(&PrivateRepoSection::new().with_branch_prefix("local"))
            .unwrap();
        assert_eq!(manager.branch_prefix(), "local");
    }

    #[test]
    fn template_round_trip_through_load() {
        let fx = Fixture::new();
        fx.write_public("[proxy]\nurl = \"http://p\"\n\n[template.branch]\nlegacy = \"x\"\n");

        let templates = TemplateConfig {
            commit: TemplateSet::new()
                .with(DEFAULT_TEMPLATE_KEY, "{{type}}: {{subject}}")
                .with(USE_SCOPE_KEY, true),
            branch: TemplateSet::new().with(DEFAULT_TEMPLATE_KEY, "{{prefix}}/{{slug}}"),
            pull_requests: TemplateSet::new(),
        };

        let mut manager = fx.manager();
        manager.save_template_config(&templates).unwrap();

        let reloaded = fx.manager();
        let loaded = reloaded.template_config();
        assert_eq!(loaded.commit, templates.commit);
        assert_eq!(loaded.branch.default_template(), Some("{{prefix}}/{{slug}}"));
        assert_eq!(loaded.branch.get_str("legacy"), Some("x"));
        assert!(loaded.use_scope());

        let content = std::fs::read_to_string(reloaded.public_config_path()).unwrap();
        assert!(content.contains("http://p"), "{content}");
    }

    #[test]
    fn template_save_does_not_touch_private_file() {
        let fx = Fixture::new();
        fx.write_private("[someone_00000000.branch]\nprefix = \"s\"\n");
        let before = std::fs::read_to_string(fx.paths().private_config()).unwrap();

        let mut manager = fx.manager();
        manager
            .save_template_config(&TemplateConfig {
                commit: TemplateSet::new().with(DEFAULT_TEMPLATE_KEY, "c"),
                ..TemplateConfig::default()
            })
            .unwrap();

        let after = std::fs::read_to_string(fx.paths().private_config()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn private_save_does_not_touch_public_file() {
        let fx = Fixture::new();
        fx.write_public("[template.commit]\ndefault = \"c\"\n");
        let public = crate::paths::public_config_path(fx.repo.path());
        let before = std::fs::read_to_string(&public).unwrap();

        let mut manager = fx.manager();
        manager
            .save_private_section(&PrivateRepoSection::new().with_branch_prefix("me"))
            .unwrap();

        assert_eq!(std::fs::read_to_string(&public).unwrap(), before);
    }

    #[test]
    fn private_save_keeps_other_repos_and_sibling_fields() {
        let fx = Fixture::new();
        let id = fx.manager().repo_id().to_string();
        fx.write_private(&format!(
            "[{id}.branch]\nignore = [\"release\"]\n\n[other_99999999]\nauto_accept_change_type = true\n"
        ));

        let mut manager = fx.manager();
        manager
            .save_private_section(&PrivateRepoSection::new().with_branch_prefix("feat"))
            .unwrap();

        let mut fresh = fx.manager();
        assert_eq!(fresh.branch_prefix(), "feat");
        assert_eq!(fresh.ignored_branches(), vec!["release".to_string()]);

        let mut other = PrivateConfigStore::new(fx.paths().private_config());
        assert_eq!(
            other.get("other_99999999").cloned(),
            Some(PrivateRepoSection::new().with_auto_accept_change_type(true))
        );
    }

    #[test]
    fn clones_of_same_remote_share_settings() {
        let fx = Fixture::new();
        let mut first = fx.manager();
        first
            .save_private_section(&PrivateRepoSection::new().with_auto_accept_change_type(true))
            .unwrap();

        let second_clone = tempfile::tempdir().unwrap();
        let port = FakeGitPort::repo(second_clone.path()).with_remote("origin", URL);
        let mut second = RepoConfigManager::new(Some(&port), &fx.paths()).unwrap();
        second.load().unwrap();
        assert!(second.auto_accept_change_type());
    }

    #[test]
    fn private_overrides_team_defaults() {
        let fx = Fixture::new();
        fx.write_public("[branch]\nprefix = \"team\"\nignore = [\"main\"]\n");

        let mut manager = fx.manager();
        assert_eq!(manager.branch_prefix(), "team");
        assert_eq!(manager.ignored_branches(), vec!["main".to_string()]);

        manager
            .save_private_section(&PrivateRepoSection::new().with_branch_prefix("mine"))
            .unwrap();
        assert_eq!(manager.branch_prefix(), "mine");
        assert_eq!(manager.ignored_branches(), vec!["main".to_string()]);
    }

    #[test]
    fn repeated_load_is_idempotent() {
        let fx = Fixture::new();
        fx.write_public("[template.commit]\ndefault = \"c\"\n");
        fx.write_private("[x_00000000]\nauto_accept_change_type = true\n");

        let mut manager = fx.manager();
        let first = (
            manager.template_config(),
            manager.branch_prefix(),
            manager.ignored_branches(),
            manager.auto_accept_change_type(),
        );
        manager.load().unwrap();
        let second = (
            manager.template_config(),
            manager.branch_prefix(),
            manager.ignored_branches(),
            manager.auto_accept_change_type(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_private_file_reads_as_defaults() {
        let fx = Fixture::new();
        fx.write_private("not = [valid");
        let mut manager = fx.manager();
        assert_eq!(manager.branch_prefix(), "");
        assert!(!manager.auto_accept_change_type());
        assert_eq!(manager.private_store().origin(), Some(SnapshotOrigin::Unreadable));
    }
}
