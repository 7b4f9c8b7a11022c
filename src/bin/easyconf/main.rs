// easyconf - inspect layered component configuration

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{execute_dump, execute_get, execute_sources};
use easyconf::cfg::{EasyConf, EasyConfConfig};

/// Load configuration from file, or use defaults
fn load_config(cli: &Cli) -> Result<EasyConfConfig> {
    let mut config = match &cli.config {
        Some(path) => EasyConfConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => EasyConfConfig::default(),
    };
    if !cli.search_paths.is_empty() {
        config.search_paths = cli.search_paths.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let easyconf = EasyConf::new(config).context("Failed to create easyconf")?;

    match &cli.command {
        Commands::Get(args) => execute_get(args, &easyconf)?,
        Commands::Sources(args) => execute_sources(args, &easyconf)?,
        Commands::Dump(args) => execute_dump(args, &easyconf)?,
    }

    Ok(())
}
