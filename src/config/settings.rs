// Configuration structs

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration, read from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord application (client) ID used for Rich Presence
    pub discord_client_id: String,

    /// Webhook used to host album artwork; artwork is skipped when unset
    #[serde(default)]
    pub discord_webhook_url: Option<String>,

    /// Interface the RPC server binds to
    #[serde(default = "default_host")]
    pub server_host: String,

    /// Port the RPC server binds to
    #[serde(default = "default_port")]
    pub server_port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    pub fn new(discord_client_id: impl Into<String>) -> Self {
        Self {
            discord_client_id: discord_client_id.into(),
            discord_webhook_url: None,
            server_host: default_host(),
            server_port: default_port(),
        }
    }

    /// Numeric application ID as Discord expects it
    pub fn client_id(&self) -> Option<i64> {
        self.discord_client_id.trim().parse().ok()
    }

    /// Webhook URL, treating an empty value as unset
    pub fn webhook_url(&self) -> Option<&str> {
        self.discord_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
