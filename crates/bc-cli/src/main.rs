use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bc_cli::commands::{check, resolve, run, schedule, util};
use bc_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise warnings only, or everything with --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    // Logs go to stderr so the clock's console output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Run { mode, at }) => {
            let config = load_config(cli.config.as_deref())?;
            let start = util::resolve_at(at.as_deref())?;
            run::run(&config, mode.unwrap_or(config.mode), start)?;
        }
        Some(Commands::Resolve { at, json }) => {
            let config = load_config(cli.config.as_deref())?;
            let resolver = util::load_resolver(&config)?;
            let at = util::resolve_at(at.as_deref())?;
            resolve::run(&mut io::stdout(), &resolver, at, *json)?;
        }
        Some(Commands::Schedule { season }) => {
            let config = load_config(cli.config.as_deref())?;
            let catalog = util::load_catalog(&config)?;
            schedule::run(&mut io::stdout(), &catalog, season.as_deref())?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            check::run(&mut io::stdout(), &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
