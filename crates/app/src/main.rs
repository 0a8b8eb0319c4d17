//! Authgate - Main Entry Point
//!
//! Logs in to the service through Twitch and keeps the credential fresh.

mod cli;
mod commands;

use anyhow::{Context, Result};
use authgate_infrastructure::SettingsRepository;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let repository = cli
        .settings
        .clone()
        .map_or_else(SettingsRepository::new, SettingsRepository::with_path);
    let mut settings = repository.load().await.context("failed to load settings")?;
    cli.apply_overrides(&mut settings);

    tracing::debug!("Starting authgate v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Login { return_to } => commands::login(&settings, return_to.as_deref()).await,
        Command::Status => commands::status(&settings).await,
        Command::Logout => commands::logout(&settings),
        Command::Watch => commands::watch(&settings).await,
    }
}
