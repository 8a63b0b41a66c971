// Artwork pipeline: thumbnail encoding and image hosting

mod thumbnail;
mod webhook;

pub use thumbnail::{encode_thumbnail, JPEG_QUALITY, THUMBNAIL_SIZE};
pub use webhook::WebhookHost;

use async_trait::async_trait;

use crate::errors::ArtworkError;

/// Somewhere that will host an image and hand back a public URL
#[async_trait]
pub trait ArtworkHost: Send + Sync {
    async fn upload(&self, jpeg: Vec<u8>) -> Result<String, ArtworkError>;
}

/// Thumbnail the base64 artwork off the async runtime, then upload it
pub async fn host_artwork(host: &dyn ArtworkHost, artwork_base64: String) -> Result<String, ArtworkError> {
    let jpeg = tokio::task::spawn_blocking(move || encode_thumbnail(&artwork_base64))
        .await
        .map_err(|e| ArtworkError::Task(e.to_string()))??;

    host.upload(jpeg).await
}
