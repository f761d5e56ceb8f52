//! `workflow repo` -- repository identity and per-repository settings.

use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::Serialize;
use toml::Value;
use workflow_config::identity::IdentitySource;
use workflow_config::public::{DEFAULT_TEMPLATE_KEY, TemplateSet, USE_SCOPE_KEY};
use workflow_config::{PrivateRepoSection, RepoConfigManager, TemplateConfig};

use crate::cli::{RepoArgs, RepoCommands, RepoSetArgs, RepoTemplateArgs};
use crate::context::RuntimeContext;
use crate::output::{display_list, output_fields, output_json};

/// Execute the `workflow repo` command.
pub fn run(ctx: &RuntimeContext, args: &RepoArgs) -> Result<()> {
    match &args.command {
        RepoCommands::Id => run_id(ctx),
        RepoCommands::Show => run_show(ctx),
        RepoCommands::Set(set_args) => run_set(ctx, set_args),
        RepoCommands::Template(template_args) => run_template(ctx, template_args),
    }
}

/// Effective personal settings for one repository.
#[derive(Debug, Serialize)]
struct PersonalSettings {
    branch_prefix: String,
    ignored_branches: Vec<String>,
    auto_accept_change_type: bool,
}

impl PersonalSettings {
    fn read(manager: &mut RepoConfigManager) -> Self {
        Self {
            branch_prefix: manager.branch_prefix(),
            ignored_branches: manager.ignored_branches(),
            auto_accept_change_type: manager.auto_accept_change_type(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RepoReport {
    id: String,
    portable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_url: Option<String>,
    root: PathBuf,
    public_config: PathBuf,
    private_config: PathBuf,
    settings: PersonalSettings,
    templates: TemplateConfig,
}

fn run_id(ctx: &RuntimeContext) -> Result<()> {
    let manager = ctx.repo_manager()?;
    if ctx.json {
        output_json(&serde_json::json!({
            "id": manager.repo_id(),
            "portable": manager.identity().is_portable(),
        }));
    } else {
        println!("{}", manager.repo_id());
    }
    Ok(())
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    let mut manager = ctx.repo_manager()?;
    let remote_url = match manager.identity().source() {
        IdentitySource::Remote { url } => Some(url.clone()),
        IdentitySource::Path => None,
    };
    let report = RepoReport {
        id: manager.repo_id().to_string(),
        portable: manager.identity().is_portable(),
        remote_url,
        root: manager.repo_root().to_path_buf(),
        public_config: manager.public_config_path().to_path_buf(),
        private_config: manager.private_config_path().to_path_buf(),
        settings: PersonalSettings::read(&mut manager),
        templates: manager.template_config(),
    };

    if ctx.json {
        output_json(&report);
        return Ok(());
    }

    let mut fields = vec![
        ("id".to_string(), report.id.clone()),
        (
            "identity".to_string(),
            match &report.remote_url {
                Some(url) => format!("remote {url}"),
                None => "path (not portable)".to_string(),
            },
        ),
        ("root".to_string(), report.root.display().to_string()),
        ("public config".to_string(), report.public_config.display().to_string()),
        ("private config".to_string(), report.private_config.display().to_string()),
        ("branch prefix".to_string(), non_empty(&report.settings.branch_prefix)),
        (
            "ignored branches".to_string(),
            display_list(&report.settings.ignored_branches),
        ),
        (
            "auto-accept change type".to_string(),
            report.settings.auto_accept_change_type.to_string(),
        ),
    ];
    fields.extend(template_fields("commit", &report.templates.commit));
    fields.extend(template_fields("branch", &report.templates.branch));
    fields.extend(template_fields("pull_requests", &report.templates.pull_requests));
    output_fields(&fields);
    Ok(())
}

fn run_set(ctx: &RuntimeContext, args: &RepoSetArgs) -> Result<()> {
    let mut patch = PrivateRepoSection::new();
    if let Some(prefix) = &args.branch_prefix {
        patch = patch.with_branch_prefix(prefix.clone());
    }
    if args.clear_ignore {
        patch = patch.with_ignored_branches(Vec::<String>::new());
    } else if !args.ignore.is_empty() {
        patch = patch.with_ignored_branches(args.ignore.iter().cloned());
    }
    if let Some(value) = args.auto_accept_change_type {
        patch = patch.with_auto_accept_change_type(value);
    }
    if patch.is_empty() {
        bail!(
            "nothing to set; pass --branch-prefix, --ignore, --clear-ignore or \
             --auto-accept-change-type"
        );
    }

    let mut manager = ctx.repo_manager()?;
    manager.save_private_section(&patch)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "id": manager.repo_id(),
            "settings": PersonalSettings::read(&mut manager),
        }));
    } else if !ctx.quiet {
        println!(
            "Saved settings for {} in {}",
            manager.repo_id(),
            manager.private_config_path().display()
        );
    }
    Ok(())
}

fn run_template(ctx: &RuntimeContext, args: &RepoTemplateArgs) -> Result<()> {
    let mut templates = TemplateConfig::default();
    if let Some(template) = &args.commit_default {
        templates.commit.set(DEFAULT_TEMPLATE_KEY, template.as_str());
    }
    if let Some(use_scope) = args.use_scope {
        templates.commit.set(USE_SCOPE_KEY, use_scope);
    }
    if let Some(template) = &args.branch_default {
        templates.branch.set(DEFAULT_TEMPLATE_KEY, template.as_str());
    }
    if let Some(template) = &args.pr_default {
        templates.pull_requests.set(DEFAULT_TEMPLATE_KEY, template.as_str());
    }
    if templates.is_empty() {
        bail!(
            "nothing to set; pass --commit-default, --use-scope, --branch-default or --pr-default"
        );
    }

    let mut manager = ctx.repo_manager()?;
    manager.save_template_config(&templates)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "path": manager.public_config_path(),
            "templates": manager.template_config(),
        }));
    } else if !ctx.quiet {
        println!("Saved templates to {}", manager.public_config_path().display());
    }
    Ok(())
}

fn template_fields(kind: &str, set: &TemplateSet) -> Vec<(String, String)> {
    set.iter()
        .map(|(key, value)| (format!("template.{kind}.{key}"), display_value(value)))
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_fields_are_prefixed() {
        let set = TemplateSet::new()
            .with(DEFAULT_TEMPLATE_KEY, "{{type}}: {{subject}}")
            .with(USE_SCOPE_KEY, false);
        let fields = template_fields("commit", &set);
        assert!(fields.contains(&(
            "template.commit.default".to_string(),
            "{{type}}: {{subject}}".to_string()
        )));
        assert!(fields.contains(&("template.commit.use_scope".to_string(), "false".to_string())));
    }

    #[test]
    fn empty_prefix_displays_dash() {
        assert_eq!(non_empty(""), "-");
        assert_eq!(non_empty("feat"), "feat");
    }
}
