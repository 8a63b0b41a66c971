// NPRPC - Relay Server Module
// HTTP/JSON-RPC front end over the presence session

mod discovery;
mod handlers;
mod rpc;
mod session;

pub use discovery::advertised_ip;
pub use handlers::{create_router, health_check, DiscoveryInfo, HealthStatus, SERVICE_NAME};
pub use rpc::{handle_rpc, parse_call, ErrorCode, Method, RpcError, RpcResponse, JSONRPC_VERSION};
pub use session::{SessionManager, SessionState, StatusSnapshot, Track};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;

/// Largest /rpc body accepted; base64 album art from a phone can run to several MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (e.g., "0.0.0.0")
    pub host: String,
    /// Bind port, also advertised via /discovery
    pub port: u16,
    /// Request body limit for /rpc
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server_host.clone(),
            port: config.server_port,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Main relay server structure
pub struct RelayServer {
    /// Presence session shared by every request
    session_manager: Arc<SessionManager>,
    /// Server configuration
    config: ServerConfig,
}

impl RelayServer {
    /// Create a new relay server
    pub fn new(config: ServerConfig, session_manager: Arc<SessionManager>) -> Self {
        Self {
            session_manager,
            config,
        }
    }

    /// Start the HTTP server and run until ctrl-c
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = tokio::net::lookup_host(self.config.bind_address())
            .await
            .with_context(|| format!("Invalid bind address {}", self.config.bind_address()))?
            .next()
            .with_context(|| format!("Bind address {} did not resolve", self.config.bind_address()))?;

        let session_manager = Arc::clone(&self.session_manager);
        let app = create_router(Arc::new(self));

        tracing::info!("RPC Server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        session_manager.shutdown().await;
        tracing::info!("RPC Server stopped");
        Ok(())
    }

    /// Get reference to session manager
    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
