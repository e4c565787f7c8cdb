//! Best-effort image push to a chat webhook.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Serialize)]
struct ImageMessage<'a> {
    msgtype: &'static str,
    image: ImageBody<'a>,
}

#[derive(Serialize)]
struct ImageBody<'a> {
    base64: &'a str,
}

/// JSON body for an image message: `{"msgtype":"image","image":{"base64":…}}`.
pub fn image_message(png: &[u8]) -> serde_json::Value {
    let encoded = STANDARD.encode(png);
    let message = ImageMessage {
        msgtype: "image",
        image: ImageBody { base64: &encoded },
    };
    serde_json::to_value(message).unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct WebhookClient {
    url: String,
    client: reqwest::Client,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Posts the image and checks the response status.
    pub async fn push(&self, png: &[u8]) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .json(&image_message(png))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status()));
        }
        tracing::info!("Pushed card to webhook ({} bytes)", png.len());
        Ok(())
    }

    /// Posts the image on a detached task.
    ///
    /// Failures are logged and dropped; the handle only reports that the
    /// attempt finished.
    pub fn dispatch(&self, png: Vec<u8>) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.push(&png).await {
                tracing::error!("Webhook push to {} failed: {}", client.url, e);
            }
        })
    }
}
