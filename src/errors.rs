// Error types
//
// Capability failures (presence client, artwork host) are typed here so the
// session manager can log them precisely before collapsing them into the
// boolean results the RPC surface reports.

use thiserror::Error;

/// Failures from the Rich Presence client
#[derive(Debug, Error)]
pub enum PresenceError {
    /// The presence client could not be created or the handshake failed
    #[error("presence connection failed: {0}")]
    Connect(String),

    /// The handshake did not complete in time
    #[error("presence handshake timed out after {0} seconds")]
    HandshakeTimeout(u64),

    /// An activity call was made without a live connection
    #[error("presence client is not connected")]
    NotConnected,

    /// Setting or clearing the activity failed
    #[error("presence activity update failed: {0}")]
    Activity(String),
}

/// Failures while turning base64 artwork into a hosted image URL
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("artwork is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("artwork could not be processed: {0}")]
    Image(#[from] image::ImageError),

    #[error("artwork processing task failed: {0}")]
    Task(String),

    #[error("artwork upload failed: {0}")]
    Upload(#[from] reqwest::Error),

    #[error("webhook rejected artwork upload\n\nStatus: {status}\nBody: {body}")]
    Rejected { status: u16, body: String },

    #[error("webhook response did not contain an attachment URL")]
    MissingAttachment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_includes_status_and_body() {
        let err = ArtworkError::Rejected {
            status: 413,
            body: "too large".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("413"));
        assert!(msg.contains("too large"));
    }

    #[test]
    fn test_handshake_timeout_message() {
        let msg = PresenceError::HandshakeTimeout(10).to_string();
        assert!(msg.contains("10 seconds"));
    }
}
