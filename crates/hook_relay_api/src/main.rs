//! Hook relay server
//!
//! # Environment Variables
//!
//! - `HOOK_RELAY_CONFIG`: configuration file (default: hook-relay.toml)
//! - `HOOK_RELAY_HOST`: address to bind to
//! - `PORT`: port to listen on (default: 3009)
//! - `HOOK_RELAY_CHANNEL_URL`: chat incoming-webhook URL
//! - `SLACK_CLIENT_ID`, `SLACK_CLIENT_SECRET`: OAuth client credentials
//! - `RUST_LOG`: log filter (default: info)

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use config_manager::{ConfigOverrides, LogFormat, RelayConfig, DEFAULT_CONFIG_FILENAME};
use hook_relay_api::{ApiConfig, ApiServer, AppState};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hook-relay")]
#[command(version, about = "Relay repository webhooks to a chat channel", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "HOOK_RELAY_CONFIG", default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Address to bind to
    #[arg(long, env = "HOOK_RELAY_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Chat incoming-webhook URL
    #[arg(long, env = "HOOK_RELAY_CHANNEL_URL")]
    channel_url: Option<String>,

    /// OAuth client id of the chat application
    #[arg(long, env = "SLACK_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret of the chat application
    #[arg(long, env = "SLACK_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            channel_url: self.channel_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = RelayConfig::load(&cli.config, &cli.overrides())
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    init_tracing(config.server.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        hosts = ?config.registry.names(),
        oauth = config.oauth.is_some(),
        "Starting hook relay"
    );

    let api_config = ApiConfig::from(&config.server);
    let state = AppState::from_config(config).context("Failed to initialise HTTP clients")?;

    ApiServer::new(api_config, state).serve().await
}
