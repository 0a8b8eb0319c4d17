//! Command implementations.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use authgate_application::{AuthManager, Destination, LoginFlow, LoginSettings, ManagerOptions};
use authgate_domain::{AuthView, CallbackParams, ClientSettings};
use authgate_infrastructure::{FileStorage, HttpAuthApi, MemoryStorage, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use url::Url;

/// Wires the manager to the configured adapters.
pub fn build_manager(settings: &ClientSettings) -> Result<AuthManager> {
    let storage_path = match &settings.storage_path {
        Some(path) => path.clone(),
        None => FileStorage::default_path()
            .context("no data directory for the credential store")?,
    };
    info!(path = %storage_path.display(), "Using credential store");

    let api = HttpAuthApi::new(&settings.api_base_url)?;
    let options = ManagerOptions::default()
        .with_refresh_delay(settings.refresh_delay())
        .with_expired_retry_delay(settings.expired_retry_delay());
    Ok(AuthManager::new(
        Arc::new(api),
        Arc::new(FileStorage::new(storage_path)),
        Arc::new(SystemClock::new()),
        options,
    ))
}

pub async fn login(settings: &ClientSettings, return_to: Option<&str>) -> Result<()> {
    settings.validate()?;
    let manager = build_manager(settings)?;
    let flow = LoginFlow::new(
        manager,
        Arc::new(MemoryStorage::new()),
        Arc::new(SystemClock::new()),
        LoginSettings::from(settings),
    );

    let url = flow.begin(return_to)?;
    println!("Open this URL in a browser and authorize the application:\n\n  {url}\n");
    println!("Then paste the URL you were redirected to:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(line) = lines.next_line().await? else {
        bail!("no redirect URL given");
    };
    let params = parse_callback(&line);

    match flow.handle_callback(&params).await {
        Destination::ReturnTo(path) => {
            print_view(&flow.manager().view());
            println!("Continue at {path}");
            Ok(())
        }
        Destination::Error { error, return_to } => {
            println!("Login failed: {error}");
            if error.is_network() {
                println!("Service used: {}", settings.api_base_url);
            }
            println!("Return to {return_to} and try again.");
            bail!(error)
        }
    }
}

pub async fn status(settings: &ClientSettings) -> Result<()> {
    let manager = build_manager(settings)?;
    let view = manager.settled().await;
    println!("{}", manager.phase().message());
    print_view(&view);
    Ok(())
}

pub fn logout(settings: &ClientSettings) -> Result<()> {
    let manager = build_manager(settings)?;
    manager.logout();
    println!("Logged out.");
    Ok(())
}

pub async fn watch(settings: &ClientSettings) -> Result<()> {
    let manager = build_manager(settings)?;
    let mut views = manager.subscribe();
    print_view(&views.borrow_and_update());

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted, stopping");
                return Ok(());
            }
            changed = views.changed() => {
                changed?;
                print_view(&views.borrow_and_update());
            }
        }
    }
}

/// Accepts either the full redirect URL or only its query string.
fn parse_callback(input: &str) -> CallbackParams {
    let input = input.trim();
    Url::parse(input).map_or_else(
        |_| CallbackParams::from_query(input.trim_start_matches('?')),
        |url| CallbackParams::from_url(&url),
    )
}

fn print_view(view: &AuthView) {
    for line in view_lines(view) {
        println!("{line}");
    }
}

fn view_lines(view: &AuthView) -> Vec<String> {
    let mut lines = Vec::new();
    if view.loading {
        lines.push("Working...".to_string());
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(auth) = &view.auth {
        lines.push(format!(
            "Logged in as {} ({}), valid until {}",
            auth.user_details.display_name,
            auth.user_details.login,
            auth.valid_until.to_rfc3339()
        ));
    } else if view.error.is_none() && !view.loading {
        lines.push("Not logged in.".to_string());
    }
    lines
}
