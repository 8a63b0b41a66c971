// Presence session lifecycle: the single connection, its flag, and the current track

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::artwork::{host_artwork, ArtworkHost};
use crate::presence::{PresenceActivity, PresenceClient};

/// The track most recently pushed to Rich Presence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    /// Hosted artwork URL, when artwork was supplied and uploaded.
    ///
    /// `None` (serialized as `null`) means the default `music_icon` asset is
    /// showing; the asset key itself is never reported here.
    pub artwork_url: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// Connection flag and current track
#[derive(Debug, Clone)]
pub struct SessionState {
    pub connected: bool,
    pub client_id: String,
    pub current_track: Option<Track>,
}

/// Point-in-time copy of the session, as reported by getStatus and /health
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub connected: bool,
    #[serde(serialize_with = "track_or_empty")]
    pub current_track: Option<Track>,
}

/// Clients expect `{}` rather than `null` when nothing is playing
pub(crate) fn track_or_empty<S: Serializer>(track: &Option<Track>, serializer: S) -> Result<S::Ok, S::Error> {
    match track {
        Some(track) => track.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Owns the presence client and serializes every state transition through it.
///
/// The client mutex is held for the whole of connect/update/clear, so those
/// never interleave. Readers only touch `state` and are never blocked by a
/// slow artwork upload.
pub struct SessionManager {
    client: Mutex<Box<dyn PresenceClient>>,
    artwork_host: Option<Arc<dyn ArtworkHost>>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(
        client_id: impl Into<String>,
        client: Box<dyn PresenceClient>,
        artwork_host: Option<Arc<dyn ArtworkHost>>,
    ) -> Self {
        Self {
            client: Mutex::new(client),
            artwork_host,
            state: RwLock::new(SessionState {
                connected: false,
                client_id: client_id.into(),
                current_track: None,
            }),
        }
    }

    /// (Re)establish the presence connection, closing any previous one first
    pub async fn connect(&self) -> bool {
        let mut client = self.client.lock().await;
        self.connect_locked(&mut **client).await
    }

    async fn connect_locked(&self, client: &mut dyn PresenceClient) -> bool {
        client.close().await;

        let client_id = self.state.read().await.client_id.clone();
        let result = client.connect().await;

        let mut state = self.state.write().await;
        match result {
            Ok(()) => {
                state.connected = true;
                tracing::info!(backend = client.name(), client_id = %client_id, "Presence connected");
                true
            }
            Err(e) => {
                state.connected = false;
                tracing::warn!(backend = client.name(), error = %e, "Presence connection failed");
                false
            }
        }
    }

    /// Show a track, connecting first if needed. Returns whether presence was updated.
    pub async fn update_presence(&self, title: &str, artist: &str, artwork_base64: Option<String>) -> bool {
        let mut client = self.client.lock().await;

        if !self.is_connected().await && !self.connect_locked(&mut **client).await {
            return false;
        }

        let artwork_url = match artwork_base64 {
            Some(artwork) if !artwork.trim().is_empty() => self.upload_artwork(artwork).await,
            _ => None,
        };

        let activity = PresenceActivity::for_track(title, artist, artwork_url.as_deref());

        match client.set_activity(&activity).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.current_track = Some(Track {
                    title: title.to_string(),
                    artist: artist.to_string(),
                    artwork_url,
                    updated_at: Utc::now(),
                });
                tracing::info!(title = %title, artist = %artist, "Rich Presence updated");
                true
            }
            Err(e) => {
                self.state.write().await.connected = false;
                tracing::error!(error = %e, "Rich Presence update failed");
                false
            }
        }
    }

    /// Artwork problems never fail the update; the default image is used instead
    async fn upload_artwork(&self, artwork_base64: String) -> Option<String> {
        let Some(host) = self.artwork_host.as_deref() else {
            tracing::debug!("No artwork host configured, using default image");
            return None;
        };

        match host_artwork(host, artwork_base64).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, "Artwork upload failed, using default image");
                None
            }
        }
    }

    /// Clear the displayed presence. No-op while disconnected.
    pub async fn clear_presence(&self) {
        let mut client = self.client.lock().await;

        if !self.is_connected().await {
            tracing::debug!("Clear requested while disconnected, nothing to do");
            return;
        }

        match client.clear_activity().await {
            Ok(()) => {
                self.state.write().await.current_track = None;
                tracing::info!("Rich Presence cleared");
            }
            Err(e) => {
                self.state.write().await.connected = false;
                tracing::error!(error = %e, "Rich Presence clear failed");
            }
        }
    }

    /// Close the presence connection on shutdown
    pub async fn shutdown(&self) {
        let mut client = self.client.lock().await;
        client.close().await;

        let mut state = self.state.write().await;
        state.connected = false;
        state.current_track = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.connected
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let state = self.state.read().await;
        StatusSnapshot {
            connected: state.connected,
            current_track: state.current_track.clone(),
        }
    }

    /// Attempt the first connection in the background so startup never waits on Discord
    pub fn spawn_initial_connect(self: &Arc<Self>) -> tokio::task::JoinHandle<bool> {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.connect().await })
    }
}
