use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vcxsync::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    vcxsync::run(&cli.into_options(cwd))?;
    Ok(())
}
