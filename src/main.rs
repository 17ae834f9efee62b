mod config;
mod host;
mod pr;
mod report;
mod review;
mod webhook;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use config::SettingsProvider;

/// PR Reviewer: receives pull-request webhooks, asks a language model for a
/// review, and posts the result back as a comment plus a risk label.
#[derive(Parser, Debug)]
#[command(name = "pr-reviewer", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to .pr-reviewer.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides [server] bind
    #[arg(short, long, env = "PR_REVIEWER_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!("pr_reviewer").entered();

    info!("loading configuration");
    let config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    // Fail fast on a missing host token; later requests re-resolve settings.
    let settings = config.settings()?;
    info!(host = %settings.host_base_url, model = %settings.model, signed = !settings.webhook_secret.is_empty(), "configuration resolved");
    if settings.completion_api_key.is_none() {
        info!("completion API key not set, reviews will post a diagnostic");
    }

    let bind = cli.bind.unwrap_or_else(|| config.bind().to_string());
    let http = reqwest::Client::builder()
        .user_agent(concat!("pr-reviewer/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let state = webhook::AppState::new(Arc::new(config), http);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %listener.local_addr()?, "listening");
    drop(_main_span);
    axum::serve(listener, webhook::router(state)).await?;

    Ok(())
}
