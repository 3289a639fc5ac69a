use anyhow::{Context, Result};
use clap::Parser;
use solarium::{app, config};
use std::{fs::File, sync::Mutex};
use tracing::Level;

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    init_logging(&cli)?;
    let settings = config::resolve_settings(&cli).context("loading settings")?;
    app::run(settings)
}

/// Logs go to `--log-file` only; the terminal belongs to the renderer.
fn init_logging(cli: &config::Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cli.log_level.unwrap_or(Level::INFO))
        .init();
    Ok(())
}
