use anyhow::Context;
use reqwest::Client;
use thiserror::Error;

use crate::models::OutputBundle;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned {0}")]
    Status(u16),
}

/// Forwards finished bundles to an automation webhook
pub struct WebhookRelay {
    client: Client,
    url: String,
}

impl WebhookRelay {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn send(&self, bundle: &OutputBundle) -> Result<(), RelayError> {
        let response = self.client.post(&self.url).json(bundle).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }

        Ok(())
    }

    /// Single best-effort attempt; the outcome is only logged
    pub async fn deliver(&self, bundle: &OutputBundle) {
        match self.send(bundle).await {
            Ok(()) => tracing::info!("outputs sent to webhook"),
            Err(e) => tracing::error!(error = %e, "failed to send outputs to webhook"),
        }
    }
}
