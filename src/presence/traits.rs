use async_trait::async_trait;
use std::time::SystemTime;

use crate::errors::PresenceError;

/// Asset key of the fallback image registered with the Discord application
pub const DEFAULT_LARGE_IMAGE: &str = "music_icon";

/// Activity fields pushed to the presence client for a playing track
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceActivity {
    /// First line: the track title
    pub details: String,
    /// Second line: "by <artist>"
    pub state: String,
    /// Hosted artwork URL or [`DEFAULT_LARGE_IMAGE`]
    pub large_image: String,
    /// Hover text for the large image
    pub large_text: String,
    /// Shown as elapsed time
    pub start: SystemTime,
}

impl PresenceActivity {
    pub fn for_track(title: &str, artist: &str, artwork_url: Option<&str>) -> Self {
        Self {
            details: title.to_string(),
            state: format!("by {}", artist),
            large_image: artwork_url.unwrap_or(DEFAULT_LARGE_IMAGE).to_string(),
            large_text: format!("{} - {}", title, artist),
            start: SystemTime::now(),
        }
    }
}

/// Connection to a Rich Presence backend (Discord, or a fake in tests)
#[async_trait]
pub trait PresenceClient: Send {
    /// Returns the name of this presence backend (for logging)
    fn name(&self) -> &'static str;

    /// Open a new connection; any previous one must already be closed
    async fn connect(&mut self) -> Result<(), PresenceError>;

    /// Replace the displayed activity
    async fn set_activity(&mut self, activity: &PresenceActivity) -> Result<(), PresenceError>;

    /// Remove the displayed activity
    async fn clear_activity(&mut self) -> Result<(), PresenceError>;

    /// Drop the connection if one is open
    async fn close(&mut self);
}
