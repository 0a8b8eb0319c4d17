//! Command-line interface definition.

use std::path::PathBuf;

use authgate_domain::ClientSettings;
use clap::{Parser, Subcommand};

/// Log in to the service with a Twitch account and keep the credential fresh.
#[derive(Debug, Parser)]
#[command(name = "authgate", version, about)]
pub struct Cli {
    /// Settings file to read instead of the default one.
    #[arg(long, env = "AUTHGATE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Base URL of the service.
    #[arg(long, env = "AUTHGATE_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Twitch application client id.
    #[arg(long, env = "AUTHGATE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Redirect URI registered with the Twitch application.
    #[arg(long, env = "AUTHGATE_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in through Twitch.
    Login {
        /// Path to return to once logged in.
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Show the current authorization.
    Status,
    /// Forget the stored credential.
    Logout,
    /// Keep the credential refreshed until interrupted.
    Watch,
}

impl Cli {
    /// Applies command-line and environment overrides on top of the file.
    pub fn apply_overrides(&self, settings: &mut ClientSettings) {
        if let Some(url) = &self.api_base_url {
            settings.api_base_url.clone_from(url);
        }
        if let Some(client_id) = &self.client_id {
            settings.client_id.clone_from(client_id);
        }
        if let Some(uri) = &self.redirect_uri {
            settings.redirect_uri.clone_from(uri);
        }
    }
}
