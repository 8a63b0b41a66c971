// NPRPC - Now-playing Rich Presence relay
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use nprpc::artwork::{ArtworkHost, WebhookHost};
use nprpc::config::load_config;
use nprpc::logging::init_logging;
use nprpc::presence::DiscordPresence;
use nprpc::server::{RelayServer, ServerConfig, SessionManager};

#[derive(Parser, Debug)]
#[command(name = "nprpc")]
#[command(about = "Relay now-playing music from your phone to Discord Rich Presence", version)]
struct Args {
    /// Bind host (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Read environment from this file instead of ./.env
    #[arg(long = "env-file")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    let mut config = load_config(args.env_file.as_deref())?;
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let app_id = config
        .client_id()
        .context("DISCORD_CLIENT_ID must be a numeric Discord application ID")?;

    let artwork_host: Option<Arc<dyn ArtworkHost>> = match config.webhook_url() {
        Some(url) => Some(Arc::new(
            WebhookHost::new(url).context("Failed to create webhook HTTP client")?,
        )),
        None => {
            tracing::warn!("DISCORD_WEBHOOK_URL is not set; album artwork is disabled");
            None
        }
    };

    let session_manager = Arc::new(SessionManager::new(
        config.discord_client_id.clone(),
        Box::new(DiscordPresence::new(app_id)),
        artwork_host,
    ));

    // First connection happens in the background; updates retry it implicitly
    session_manager.spawn_initial_connect();

    let server = RelayServer::new(ServerConfig::from(&config), session_manager);
    server.serve().await
}
