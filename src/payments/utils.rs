use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::types::ProviderName;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// Raw provider reply: status plus the body parsed as JSON when possible
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: StatusCode,
    pub body: Option<JsonValue>,
}

/// Thin HTTP wrapper shared by providers. One attempt per call; no retries.
#[derive(Clone)]
pub struct PaymentHttpClient {
    client: reqwest::Client,
    provider: ProviderName,
}

impl PaymentHttpClient {
    /// `timeout: None` leaves the outbound call unbounded.
    pub fn new(provider: ProviderName, timeout: Option<Duration>) -> PaymentResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| PaymentError::NetworkError {
            provider: provider.display_name().to_string(),
            message: format!("failed to initialize HTTP client: {}", e),
        })?;

        Ok(Self { client, provider })
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer_token: &str,
        body: &B,
    ) -> PaymentResult<ProviderReply> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .json(body)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError {
                provider: self.provider.display_name().to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError {
                provider: self.provider.display_name().to_string(),
                message: format!("failed to read response body: {}", e),
            })?;

        let body = serde_json::from_str::<JsonValue>(&text).ok();
        debug!(provider = %self.provider, status = %status, "provider replied");

        Ok(ProviderReply { status, body })
    }
}
