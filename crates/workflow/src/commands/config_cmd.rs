//! `workflow config` -- manage the user-wide configuration (get/set/show/path).

use anyhow::{Context, Result};
use toml::{Table, Value};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `workflow config` command.
pub fn run(ctx: &mut RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Get(get_args) => {
            let value = ctx
                .global_config
                .get(&get_args.key)
                .with_context(|| format!("key '{}' not found", get_args.key))?;

            if ctx.json {
                output_json(&serde_json::json!({
                    "key": get_args.key,
                    "value": value,
                }));
            } else if value.is_table() {
                print!("{}", toml::to_string_pretty(value)?);
            } else {
                println!("{}", ctx.global_config.get_string(&get_args.key));
            }
        }

        ConfigCommands::Set(set_args) => {
            let value = parse_value(&set_args.value);
            ctx.global_config.set(&set_args.key, value.clone())?;
            ctx.global_config.persist()?;

            if ctx.json {
                output_json(&serde_json::json!({
                    "key": set_args.key,
                    "value": value,
                }));
            } else if !ctx.quiet {
                println!("Set {} = {}", set_args.key, value);
            }
        }

        ConfigCommands::Show(show_args) => {
            if show_args.effective {
                let config = ctx.global_config.config()?;
                if ctx.json {
                    output_json(&config);
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            } else if ctx.json {
                output_json(ctx.global_config.document());
            } else {
                print!("{}", toml::to_string_pretty(ctx.global_config.document())?);
            }
        }

        ConfigCommands::Path => {
            let path = ctx.global_config.path();
            if ctx.json {
                output_json(&serde_json::json!({ "path": path }));
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Interpret a command-line value as a TOML value (`true`, `3`, `[1, 2]`),
/// falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("value = {raw}"))
        .ok()
        .filter(|table| table.len() == 1)
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
