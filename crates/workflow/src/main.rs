//! `workflow` -- repository-aware developer workflow settings.
//!
//! Parses CLI arguments with clap, builds the runtime context, installs
//! logging and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command, &cli.global) {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{e:#}"),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn run(command: Option<Commands>, global: &cli::GlobalArgs) -> anyhow::Result<()> {
    match command {
        Some(Commands::Repo(args)) => {
            let ctx = start(global)?;
            commands::repo_cmd::run(&ctx, &args)
        }
        Some(Commands::Config(args)) => {
            let mut ctx = start(global)?;
            commands::config_cmd::run(&mut ctx, &args)
        }
        // Version and completion need neither a home directory nor a repository.
        Some(Commands::Version) => commands::version::run(global.json),
        Some(Commands::Completion(args)) => commands::completion::run(&args),
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}

fn start(global: &cli::GlobalArgs) -> anyhow::Result<RuntimeContext> {
    let ctx = RuntimeContext::from_global_args(global)?;
    init_logging(&ctx);
    Ok(ctx)
}

/// Log to stderr. `RUST_LOG` wins over the level derived from flags and
/// the global config.
fn init_logging(ctx: &RuntimeContext) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(ctx.log_level().to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
