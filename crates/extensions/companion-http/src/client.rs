//! Outbound pushes as JSON `POST`s.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use bite_config::CompanionConfig;
use bite_protocols::{Companion, Push, PushReceipt, TransportError};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// [`Companion`] that posts each push to `{base_url}{push.path()}`.
pub struct HttpCompanion {
    client: Client,
    config: CompanionConfig,
}

impl HttpCompanion {
    pub fn new(config: CompanionConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }
}

#[async_trait]
impl Companion for HttpCompanion {
    async fn push(&self, push: Push) -> Result<PushReceipt, TransportError> {
        let url = self.config.endpoint(push.path());
        let body = serde_json::to_string(&push.body()?)?;
        debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(TransportError::Status { status, body });
        }
        Ok(PushReceipt { status, body })
    }
}
