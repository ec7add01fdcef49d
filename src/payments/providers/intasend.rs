use crate::config::IntaSendConfig;
use crate::logging::{mask_email, mask_phone_number};
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::PaymentProvider;
use crate::payments::types::{
    decimal_to_json, ProviderName, PushPaymentRequest, PushPaymentResponse,
};
use crate::payments::utils::PaymentHttpClient;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, warn};

const STK_PUSH_PATH: &str = "/api/v1/payment/mpesa-stk-push/";
const FALLBACK_ERROR_MESSAGE: &str = "Payment failed";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "IntaSend credentials not configured";

/// M-Pesa STK push through IntaSend
pub struct IntaSendProvider {
    config: IntaSendConfig,
    http: PaymentHttpClient,
}

#[derive(Debug, Serialize)]
struct StkPushPayload<'a> {
    public_key: &'a str,
    amount: JsonValue,
    currency: &'a str,
    mobile_number: &'a str,
    email: &'a str,
    api_ref: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    host: &'a str,
}

impl IntaSendProvider {
    pub fn new(config: IntaSendConfig) -> PaymentResult<Self> {
        let http = PaymentHttpClient::new(
            ProviderName::IntaSend,
            config.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.config.base_url, STK_PUSH_PATH)
    }

    fn credentials(&self) -> PaymentResult<(&str, &str)> {
        match (
            self.config.public_key.as_deref(),
            self.config.private_key.as_deref(),
        ) {
            (Some(public_key), Some(private_key)) => Ok((public_key, private_key)),
            _ => Err(PaymentError::Configuration {
                message: MISSING_CREDENTIALS_MESSAGE.to_string(),
            }),
        }
    }

    fn provider_label() -> String {
        ProviderName::IntaSend.display_name().to_string()
    }
}

/// Provider error text: `message`, then `detail`, then a generic fallback
fn error_message(body: Option<&JsonValue>) -> String {
    body.and_then(|b| {
        b.get("message")
            .and_then(JsonValue::as_str)
            .or_else(|| b.get("detail").and_then(JsonValue::as_str))
    })
    .filter(|m| !m.trim().is_empty())
    .unwrap_or(FALLBACK_ERROR_MESSAGE)
    .to_string()
}

/// Payment identifier from `id`, falling back to `payment_id`
fn payment_id(body: &JsonValue) -> Option<String> {
    ["id", "payment_id"].iter().find_map(|key| match body.get(*key) {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[async_trait]
impl PaymentProvider for IntaSendProvider {
    async fn initiate_push_payment(
        &self,
        request: PushPaymentRequest,
    ) -> PaymentResult<PushPaymentResponse> {
        let (public_key, private_key) = self.credentials()?;

        let payload = StkPushPayload {
            public_key,
            amount: decimal_to_json(&request.amount),
            currency: &request.currency,
            mobile_number: &request.payer.phone_number,
            email: &request.payer.email,
            api_ref: &request.api_ref,
            first_name: &request.payer.first_name,
            last_name: &request.payer.last_name,
            host: &request.host,
        };

        info!(
            api_ref = %request.api_ref,
            amount = %request.amount,
            currency = %request.currency,
            mobile_number = %mask_phone_number(&request.payer.phone_number),
            email = %mask_email(&request.payer.email),
            host = %request.host,
            "Sending STK push request to IntaSend"
        );

        let reply = self
            .http
            .post_json(&self.endpoint(), private_key, &payload)
            .await?;

        if !reply.status.is_success() {
            let message = error_message(reply.body.as_ref());
            warn!(
                api_ref = %request.api_ref,
                status = %reply.status,
                message = %message,
                "IntaSend rejected STK push"
            );
            return Err(PaymentError::ProviderError {
                provider: Self::provider_label(),
                message,
                status: Some(reply.status.as_u16()),
            });
        }

        let body = reply.body.ok_or_else(|| PaymentError::MalformedResponse {
            provider: Self::provider_label(),
            message: "response body is not JSON".to_string(),
        })?;

        let payment_id = payment_id(&body).ok_or_else(|| PaymentError::MalformedResponse {
            provider: Self::provider_label(),
            message: "missing payment identifier".to_string(),
        })?;

        let checkout_url = body
            .get("checkout_url")
            .and_then(JsonValue::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        info!(
            api_ref = %request.api_ref,
            payment_id = %payment_id,
            has_checkout_url = checkout_url.is_some(),
            "IntaSend STK push initiated"
        );

        Ok(PushPaymentResponse {
            payment_id,
            checkout_url,
            provider_data: Some(body),
        })
    }

    fn name(&self) -> ProviderName {
        ProviderName::IntaSend
    }
}
