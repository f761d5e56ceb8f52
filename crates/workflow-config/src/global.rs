//! User-wide settings in `~/.workflow/config.toml`.
//!
//! The file is independent of any repository. It holds the log level,
//! LLM provider settings, GitHub and Jira credentials, and proxy settings.
//!
//! [`GlobalConfigManager`] edits the file as an untyped TOML document with
//! dotted keys, so sections it does not know about survive a round trip.
//! [`GlobalConfigManager::config`] gives the typed view, layered as
//! compiled defaults, then the document, then `WORKFLOW_*` environment
//! variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::document::{get_path, set_path};
use crate::error::{ConfigError, Result};
use crate::io::{read_toml, write_toml};
use crate::paths::WorkflowPaths;

/// Prefix of environment variables that override the global file.
/// Nested keys are separated by `__`, as in `WORKFLOW_LOG__LEVEL=debug`.
/// `WORKFLOW_HOME` selects the directory and is not a setting.
pub const ENV_PREFIX: &str = "WORKFLOW_";

/// Accepted values for `log.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

const LOG_LEVEL_KEY: &str = "log.level";
const DEFAULT_LOG_LEVEL: &str = "info";

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

/// The typed global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub log: LogConfig,
    pub llm: LlmConfig,
    pub github: GitHubConfig,
    pub jira: JiraConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of [`LOG_LEVELS`].
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Settings for the LLM provider used by content generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Name of the active entry in `accounts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<GitHubAccount>,
}

impl GitHubConfig {
    /// The account named by `current`, or the first account when `current`
    /// is unset or names no account.
    pub fn current_account(&self) -> Option<&GitHubAccount> {
        self.current
            .as_deref()
            .and_then(|name| self.accounts.iter().find(|account| account.name == name))
            .or_else(|| self.accounts.first())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubAccount {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<String>,
}

/// Check that `level` is one of [`LOG_LEVELS`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn validate_log_level(level: &str) -> Result<()> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: LOG_LEVEL_KEY.to_string(),
            reason: format!("'{level}' is not one of {}", LOG_LEVELS.join(", ")),
        })
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Reads and writes the global config file.
#[derive(Debug, Clone)]
pub struct GlobalConfigManager {
    path: PathBuf,
    document: Table,
    defaults: Table,
}

impl GlobalConfigManager {
    /// Manager for `~/.workflow/config.toml` (or its `WORKFLOW_HOME` override).
    pub fn new(paths: &WorkflowPaths) -> Self {
        Self::at(paths.global_config())
    }

    /// Manager for an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Table::new(),
            defaults: to_table(&GlobalConfig::default()).unwrap_or_default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw document as last loaded or edited.
    pub fn document(&self) -> &Table {
        &self.document
    }

    /// Read the file, creating it with defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if the default file
    /// cannot be written.
    pub fn load(&mut self) -> Result<()> {
        match read_toml::<Table>(&self.path)? {
            Some(document) => self.document = document,
            None => {
                self.document = to_table(&GlobalConfig::default())?;
                self.persist()?;
            }
        }
        Ok(())
    }

    /// Value at a dotted key, such as `jira.service_address`.
    ///
    /// Keys missing from the document fall back to the compiled defaults,
    /// so `log.level` agrees with [`GlobalConfigManager::config`] when the
    /// file has no `[log]` section.
    pub fn get(&self, key: &str) -> Option<&Value> {
        get_path(&self.document, key).or_else(|| get_path(&self.defaults, key))
    }

    /// String form of the value at `key`.
    ///
    /// Strings are returned as-is and other scalars and arrays in their TOML
    /// form. Keys with neither a value nor a default, and sections, give
    /// `""`.
    pub fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Table(_)) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Set a dotted key in memory, creating sections as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] for malformed keys and
    /// [`ConfigError::InvalidValue`] for an unknown log level.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if key == LOG_LEVEL_KEY {
            match value.as_str() {
                Some(level) => validate_log_level(level)?,
                None => {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        reason: "expected a string".to_string(),
                    });
                }
            }
        }
        set_path(&mut self.document, key, value)
    }

    /// Write the in-memory document to disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn persist(&self) -> Result<()> {
        write_toml(&self.path, &self.document)
    }

    /// Replace the sections of `config` in the on-disk file.
    ///
    /// The file is re-read first; top-level sections that `config` does not
    /// produce are left as they are.
    ///
    /// # Errors
    ///
    /// Fails on an invalid log level, or if the file cannot be read, parsed
    /// or written.
    pub fn save(&mut self, config: &GlobalConfig) -> Result<()> {
        validate_log_level(&config.log.level)?;

        let mut document = read_toml::<Table>(&self.path)?.unwrap_or_default();
        for (section, value) in to_table(config)? {
            document.insert(section, value);
        }
        write_toml(&self.path, &document)?;
        self.document = document;
        Ok(())
    }

    /// The typed configuration: defaults, then the document, then
    /// `WORKFLOW_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails if a value has the wrong type or the log level is unknown.
    pub fn config(&self) -> Result<GlobalConfig> {
        let document = toml::to_string(&self.document)?;
        let config: GlobalConfig = Figment::from(Serialized::defaults(GlobalConfig::default()))
            .merge(Toml::string(&document))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .split("__")
                    .ignore(&["home"]),
            )
            .extract()?;
        validate_log_level(&config.log.level)?;
        Ok(config)
    }
}

fn to_table(config: &GlobalConfig) -> Result<Table> {
    match Value::try_from(config)? {
        Value::Table(table) => Ok(table),
        _ => Ok(Table::new()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn manager_in(dir: &tempfile::TempDir) -> GlobalConfigManager {
        GlobalConfigManager::at(dir.path().join("config.toml"))
    }

    #[test]
    fn first_load_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();

        assert!(manager.path().exists());
        assert_eq!(manager.get_string("log.level"), "info");

        let on_disk: Table =
            toml::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
        assert_eq!(
            get_path(&on_disk, "log.level").and_then(Value::as_str),
            Some("info")
        );
    }

    #[test]
    fn new_uses_workflow_home() {
        let paths = WorkflowPaths::at("/home/u/.workflow");
        let manager = GlobalConfigManager::new(&paths);
        assert_eq!(manager.path(), Path::new("/home/u/.workflow/config.toml"));
    }

    #[test]
    fn existing_file_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = "# mine\n[jira]\nemail = \"me@example.com\"\n";
        std::fs::write(&path, original).unwrap();

        let mut manager = GlobalConfigManager::at(&path);
        manager.load().unwrap();
        assert_eq!(manager.get_string("jira.email"), "me@example.com");
        assert_eq!(manager.get_string("log.level"), "info");
        assert!(!manager.document().contains_key("log"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn missing_log_section_reads_like_typed_view() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[jira]\nemail = \"me@example.com\"\n")?;
            let mut manager = GlobalConfigManager::at(jail.directory().join("config.toml"));
            manager.load().map_err(|e| e.to_string())?;

            let config = manager.config().map_err(|e| e.to_string())?;
            assert_eq!(manager.get_string("log.level"), config.log.level);
            assert_eq!(manager.get("log.level").and_then(Value::as_str), Some("info"));

            manager.set("log.level", "warn").map_err(|e| e.to_string())?;
            assert_eq!(manager.get_string("log.level"), "warn");
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log\n").unwrap();
        let err = GlobalConfigManager::at(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");
    }

    #[test]
    fn dotted_set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();

        manager.set("jira.service_address", "https://jira.example.com").unwrap();
        manager.set("llm.max_tokens", 512_i64).unwrap();
        assert_eq!(manager.get_string("jira.service_address"), "https://jira.example.com");
        assert_eq!(manager.get("llm.max_tokens").and_then(Value::as_integer), Some(512));
        assert_eq!(manager.get_string("llm.max_tokens"), "512");
        assert_eq!(manager.get_string("jira"), "");
        assert_eq!(manager.get_string("missing.key"), "");
    }

    #[test]
    fn set_is_memory_only_until_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();
        manager.set("proxy.http", "http://proxy:3128").unwrap();

        let mut reread = manager_in(&dir);
        reread.load().unwrap();
        assert_eq!(reread.get_string("proxy.http"), "");

        manager.persist().unwrap();
        reread.load().unwrap();
        assert_eq!(reread.get_string("proxy.http"), "http://proxy:3128");
    }

    #[test]
    fn bad_keys_and_levels_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();

        let err = manager.set("log..level", "info").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { .. }), "{err:?}");

        let err = manager.set("log.level.deep", "info").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { .. }), "{err:?}");

        let err = manager.set("log.level", "loud").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err:?}");
        assert_eq!(manager.get_string("log.level"), "info");

        manager.set("log.level", "debug").unwrap();
        assert_eq!(manager.get_string("log.level"), "debug");
    }

    #[test]
    fn save_keeps_unknown_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[future]\nflag = true\n\n[log]\nlevel = \"warn\"\n").unwrap();

        let mut manager = GlobalConfigManager::at(&path);
        manager.load().unwrap();

        let mut config = GlobalConfig::default();
        config.log.level = "error".to_string();
        config.jira.email = Some("me@example.com".to_string());
        manager.save(&config).unwrap();

        let mut reread = GlobalConfigManager::at(&path);
        reread.load().unwrap();
        assert_eq!(reread.get("future.flag").and_then(Value::as_bool), Some(true));
        assert_eq!(reread.get_string("log.level"), "error");
        assert_eq!(reread.get_string("jira.email"), "me@example.com");
    }

    #[test]
    fn save_rejects_bad_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        let mut config = GlobalConfig::default();
        config.log.level = "chatty".to_string();
        assert!(manager.save(&config).is_err());
        assert!(!manager.path().exists());
    }

    #[test]
    fn current_account_resolution() {
        let account = |name: &str| GitHubAccount {
            name: name.to_string(),
            email: None,
            token: format!("tok-{name}"),
        };
        let mut github = GitHubConfig {
            current: None,
            accounts: vec![account("work"), account("personal")],
        };
        assert_eq!(github.current_account().map(|a| a.name.as_str()), Some("work"));

        github.current = Some("personal".to_string());
        assert_eq!(
            github.current_account().map(|a| a.token.as_str()),
            Some("tok-personal")
        );

        github.current = Some("gone".to_string());
        assert_eq!(github.current_account().map(|a| a.name.as_str()), Some("work"));

        assert!(GitHubConfig::default().current_account().is_none());
    }

    #[test]
    fn typed_view_reads_document() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [log]
                level = "warn"

                [github]
                current = "work"

                [[github.accounts]]
                name = "work"
                token = "t1"
                "#,
            )?;
            let mut manager = GlobalConfigManager::at(jail.directory().join("config.toml"));
            manager.load().map_err(|e| e.to_string())?;

            let config = manager.config().map_err(|e| e.to_string())?;
            assert_eq!(config.log.level, "warn");
            assert_eq!(config.github.current_account().map(|a| a.token.as_str()), Some("t1"));
            assert_eq!(config.proxy, ProxyConfig::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_log_level() {
        Jail::expect_with(|jail| {
            jail.set_env("WORKFLOW_LOG__LEVEL", "debug");
            jail.set_env("WORKFLOW_JIRA__EMAIL", "env@example.com");
            jail.set_env("WORKFLOW_HOME", jail.directory().display().to_string());

            let mut manager = GlobalConfigManager::at(jail.directory().join("config.toml"));
            manager.load().map_err(|e| e.to_string())?;

            let config = manager.config().map_err(|e| e.to_string())?;
            assert_eq!(config.log.level, "debug");
            assert_eq!(config.jira.email.as_deref(), Some("env@example.com"));
            assert_eq!(manager.get_string("log.level"), "info");
            Ok(())
        });
    }

    #[test]
    fn env_with_bad_level_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("WORKFLOW_LOG__LEVEL", "verbose");
            let mut manager = GlobalConfigManager::at(jail.directory().join("config.toml"));
            manager.load().map_err(|e| e.to_string())?;
            let err = manager.config().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err:?}");
            Ok(())
        });
    }
}
