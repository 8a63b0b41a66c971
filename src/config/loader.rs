// Configuration loader
// Loads settings from the process environment, optionally seeded from a .env file

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;

use super::settings::{Config, DEFAULT_HOST, DEFAULT_PORT};

/// Load configuration from `.env` (if present) and environment variables
pub fn load_config(env_file: Option<&Path>) -> Result<Config> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to read env file {}", path.display()))?;
        }
        None => {
            // A missing .env is the normal case
            dotenvy::dotenv().ok();
        }
    }

    load_from_environment(config::Environment::default())
}

/// Build a [`Config`] from an environment source and validate it
pub fn load_from_environment(source: config::Environment) -> Result<Config> {
    let settings = config::Config::builder()
        .set_default("server_host", DEFAULT_HOST)?
        .set_default("server_port", i64::from(DEFAULT_PORT))?
        .add_source(source)
        .build()
        .context("Failed to read configuration from environment")?;

    let config: Config = settings.try_deserialize().map_err(|e| {
        if e.to_string().contains("discord_client_id") {
            anyhow!(missing_client_id())
        } else {
            anyhow::Error::new(e).context("Invalid configuration")
        }
    })?;

    if config.discord_client_id.trim().is_empty() {
        bail!(missing_client_id());
    }
    if config.client_id().is_none() {
        bail!(
            "DISCORD_CLIENT_ID must be a numeric Discord application ID, got '{}'",
            config.discord_client_id
        );
    }

    Ok(config)
}

fn missing_client_id() -> String {
    "DISCORD_CLIENT_ID is not set.\n\n\
    Create an application at https://discord.com/developers/applications\n\
    and export its ID:\n\n\
    export DISCORD_CLIENT_ID=\"123456789012345678\""
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_from_environment(env(&[("DISCORD_CLIENT_ID", "1234567890")])).unwrap();
        assert_eq!(config.client_id(), Some(1234567890));
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 8080);
        assert!(config.webhook_url().is_none());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = load_from_environment(env(&[
            ("DISCORD_CLIENT_ID", "42"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.server_port, 9090);
        assert_eq!(
            config.webhook_url(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
    }

    #[test]
    fn test_missing_client_id_is_fatal() {
        let result = load_from_environment(env(&[("SERVER_PORT", "9090")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DISCORD_CLIENT_ID"));
    }

    #[test]
    fn test_non_numeric_client_id_rejected() {
        let result = load_from_environment(env(&[("DISCORD_CLIENT_ID", "not-a-number")]));
        assert!(result.unwrap_err().to_string().contains("numeric"));
    }

    #[test]
    fn test_empty_webhook_treated_as_unset() {
        let config = load_from_environment(env(&[
            ("DISCORD_CLIENT_ID", "42"),
            ("DISCORD_WEBHOOK_URL", ""),
        ]))
        .unwrap();
        assert!(config.webhook_url().is_none());
    }

    #[test]
    fn test_env_file_loaded() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NPRPC_TEST_ONLY_VAR=from-file").unwrap();

        // Missing client id still fails, but the file itself must be readable
        let _ = load_config(Some(file.path()));
        assert_eq!(
            std::env::var("NPRPC_TEST_ONLY_VAR").as_deref(),
            Ok("from-file")
        );
    }

    #[test]
    fn test_missing_env_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/nprpc.env")));
        assert!(result.unwrap_err().to_string().contains("env file"));
    }
}
