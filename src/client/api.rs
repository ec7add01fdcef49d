use crate::api::payments::PaymentSuccessResponse;
use crate::api::PROCESS_PAYMENT_PATH;
use crate::middleware::error::FailureResponse;
use crate::payments::types::{serialize_amount, PaymentType};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Serialize;
use tracing::{debug, warn};

pub const FALLBACK_FAILURE_MESSAGE: &str = "Payment failed";

/// Body the form sends to `process-payment`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSubmission {
    #[serde(serialize_with = "serialize_amount")]
    pub amount: BigDecimal,
    pub currency: String,
    pub phone_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The function answered with `success: false`; carries its `error`
    #[error("{message}")]
    Rejected { message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

#[async_trait]
pub trait PaymentFunction: Send + Sync {
    async fn process_payment(
        &self,
        access_token: &str,
        submission: &PaymentSubmission,
    ) -> Result<PaymentSuccessResponse, ClientError>;
}

/// Calls the deployed function at `{base_url}/functions/v1/process-payment`
pub struct PaymentFunctionClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl PaymentFunctionClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

fn failure_message(body: &str) -> String {
    serde_json::from_str::<FailureResponse>(body)
        .ok()
        .map(|failure| failure.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string())
}

#[async_trait]
impl PaymentFunction for PaymentFunctionClient {
    async fn process_payment(
        &self,
        access_token: &str,
        submission: &PaymentSubmission,
    ) -> Result<PaymentSuccessResponse, ClientError> {
        let url = format!("{}{}", self.base_url, PROCESS_PAYMENT_PATH);
        debug!(url = %url, payment_type = %submission.payment_type, "Invoking process-payment");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .json(submission)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ClientError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "process-payment returned failure");
            return Err(ClientError::Rejected {
                message: failure_message(&text),
            });
        }

        match serde_json::from_str::<PaymentSuccessResponse>(&text) {
            Ok(body) if body.success => Ok(body),
            Ok(_) => Err(ClientError::Rejected {
                message: failure_message(&text),
            }),
            Err(_) => {
                if serde_json::from_str::<FailureResponse>(&text).is_ok() {
                    Err(ClientError::Rejected {
                        message: failure_message(&text),
                    })
                } else {
                    Err(ClientError::UnexpectedResponse {
                        message: text.chars().take(200).collect(),
                    })
                }
            }
        }
    }
}
