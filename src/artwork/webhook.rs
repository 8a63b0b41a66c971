// Discord webhook image host
// Posts the thumbnail as a message attachment and returns its CDN URL

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::ArtworkHost;
use crate::errors::ArtworkError;

const UPLOAD_TIMEOUT_SECS: u64 = 15;
const ARTWORK_FILE_NAME: &str = "artwork.jpg";

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    url: String,
}

pub struct WebhookHost {
    client: Client,
    webhook_url: String,
}

impl WebhookHost {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, ArtworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl ArtworkHost for WebhookHost {
    async fn upload(&self, jpeg: Vec<u8>) -> Result<String, ArtworkError> {
        let part = reqwest::multipart::Part::bytes(jpeg)
            .file_name(ARTWORK_FILE_NAME)
            .mime_str("image/jpeg")?;

        let form = reqwest::multipart::Form::new()
            .text(
                "content",
                format!("Album artwork - {}", chrono::Utc::now().timestamp()),
            )
            .part("file", part);

        // wait=true makes Discord return the created message (with attachments)
        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("wait", "true")])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArtworkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message: WebhookMessage = response.json().await?;
        let url = message
            .attachments
            .into_iter()
            .next()
            .map(|a| a.url)
            .ok_or(ArtworkError::MissingAttachment)?;

        tracing::debug!(url = %url, "Artwork uploaded to webhook");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_upload_returns_attachment_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"^/api/webhooks/1/token".to_string()))
            .match_query(Matcher::UrlEncoded("wait".into(), "true".into()))
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"1","attachments":[{"url":"https://cdn.discordapp.com/a/artwork.jpg"}]}"#)
            .create_async()
            .await;

        let host = WebhookHost::new(format!("{}/api/webhooks/1/token", server.url())).unwrap();
        let url = host.upload(vec![0xFF, 0xD8, 0xFF]).await.unwrap();

        assert_eq!(url, "https://cdn.discordapp.com/a/artwork.jpg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_without_attachments_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id":"1","attachments":[]}"#)
            .create_async()
            .await;

        let host = WebhookHost::new(server.url()).unwrap();
        let err = host.upload(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, ArtworkError::MissingAttachment));
    }

    #[tokio::test]
    async fn test_upload_rejected_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Invalid Webhook Token"}"#)
            .create_async()
            .await;

        let host = WebhookHost::new(server.url()).unwrap();
        match host.upload(vec![1, 2, 3]).await {
            Err(ArtworkError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid Webhook Token"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
