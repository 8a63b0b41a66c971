//! Discord Rich Presence client using discord-sdk

use std::time::Duration;

use async_trait::async_trait;
use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};

use super::traits::{PresenceActivity, PresenceClient};
use crate::errors::PresenceError;

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// A live IPC connection. The wheel must outlive the client so state updates keep flowing.
struct Connection {
    discord: Discord,
    _wheel: Wheel,
}

/// Rich Presence over the local Discord client's IPC socket
pub struct DiscordPresence {
    app_id: i64,
    connection: Option<Connection>,
}

impl DiscordPresence {
    pub fn new(app_id: i64) -> Self {
        Self {
            app_id,
            connection: None,
        }
    }

    fn discord(&self) -> Result<&Discord, PresenceError> {
        self.connection
            .as_ref()
            .map(|c| &c.discord)
            .ok_or(PresenceError::NotConnected)
    }
}

#[async_trait]
impl PresenceClient for DiscordPresence {
    fn name(&self) -> &'static str {
        "Discord"
    }

    async fn connect(&mut self) -> Result<(), PresenceError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));

        let mut user_spoke = wheel.user();

        let discord = Discord::new(self.app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(|e| PresenceError::Connect(format!("Discord not available: {:?}", e)))?;

        tracing::info!("Discord connecting...");

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                Err("Discord connection closed".to_string())
            } else {
                match &*user_spoke.0.borrow() {
                    UserState::Connected(user) => Ok(user.clone()),
                    UserState::Disconnected(err) => Err(format!("Discord disconnected: {:?}", err)),
                }
            }
        })
        .await;

        let user = match handshake {
            Ok(Ok(user)) => user,
            Ok(Err(e)) => {
                discord.disconnect().await;
                return Err(PresenceError::Connect(e));
            }
            Err(_) => {
                discord.disconnect().await;
                return Err(PresenceError::HandshakeTimeout(HANDSHAKE_TIMEOUT.as_secs()));
            }
        };

        tracing::info!(
            "Discord Rich Presence connected as {}#{}",
            user.username,
            user.discriminator.unwrap_or(0)
        );

        self.connection = Some(Connection {
            discord,
            _wheel: wheel,
        });
        Ok(())
    }

    async fn set_activity(&mut self, activity: &PresenceActivity) -> Result<(), PresenceError> {
        let builder = ActivityBuilder::new()
            .details(activity.details.clone())
            .state(activity.state.clone())
            .start_timestamp(activity.start)
            .assets(
                Assets::default().large(activity.large_image.clone(), Some(activity.large_text.clone())),
            );

        self.discord()?
            .update_activity(builder)
            .await
            .map(|_| ())
            .map_err(|e| PresenceError::Activity(format!("{:?}", e)))
    }

    async fn clear_activity(&mut self) -> Result<(), PresenceError> {
        self.discord()?
            .clear_activity()
            .await
            .map(|_| ())
            .map_err(|e| PresenceError::Activity(format!("{:?}", e)))
    }

    async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.discord.disconnect().await;
            tracing::info!("Discord Rich Presence disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_activity_calls_require_connection() {
        let mut presence = DiscordPresence::new(1);
        let activity = PresenceActivity::for_track("Song", "Band", None);

        assert!(matches!(
            presence.set_activity(&activity).await,
            Err(PresenceError::NotConnected)
        ));
        assert!(matches!(
            presence.clear_activity().await,
            Err(PresenceError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_close_without_connection_is_noop() {
        let mut presence = DiscordPresence::new(1);
        presence.close().await;
        assert!(presence.connection.is_none());
    }
}
