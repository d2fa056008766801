use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bounty_cli::commands::{balance, days, holidays, init};
use bounty_cli::{Cli, Commands, Config, default_config_file};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Balance { hours, to, json }) => {
            let config = load_config(cli.config.as_deref())?;
            balance::run(&mut stdout, &config, *hours, *to, *json)?;
        }
        Some(Commands::Holidays { from, to, json }) => {
            let config = load_config(cli.config.as_deref())?;
            holidays::run(&mut stdout, &config, *from, *to, *json)?;
        }
        Some(Commands::Days { from, to, json }) => {
            let config = load_config(cli.config.as_deref())?;
            days::run(&mut stdout, &config, *from, *to, *json)?;
        }
        Some(Commands::Init { force }) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => default_config_file().context("could not determine config directory")?,
            };
            init::run(&mut stdout, &path, *force)?;
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
