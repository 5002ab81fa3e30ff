mod app;
mod config;

use anyhow::{Context, Result};
use clap::Parser;

use app::{Cli, run};
use config::FiltersConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = FiltersConfig::load_optional(cli.config.as_deref())
        .context("CLI: Failed to load attribute definitions")?;
    if let Some(path) = &cli.config {
        tracing::info!(
            "Config: {} attribute definitions from {:?}",
            config.attributes.len(),
            path
        );
    }

    let output = run(&cli, &config)?;
    println!("{output}");

    Ok(())
}
