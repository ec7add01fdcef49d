use crate::payments::error::PaymentError;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    #[serde(rename = "intasend")]
    IntaSend,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::IntaSend => "intasend",
        }
    }

    /// Name used in client-facing error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderName::IntaSend => "IntaSend",
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "intasend" => Ok(ProviderName::IntaSend),
            _ => Err(PaymentError::Configuration {
                message: format!("unsupported provider: {}", value),
            }),
        }
    }
}

/// Purpose of a payment, stored verbatim as the transaction type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Donation,
    DeliveryFee,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Donation => "donation",
            PaymentType::DeliveryFee => "delivery_fee",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = PaymentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "donation" => Ok(PaymentType::Donation),
            "delivery_fee" => Ok(PaymentType::DeliveryFee),
            other => Err(PaymentError::Configuration {
                message: format!("unsupported payment type: {}", other),
            }),
        }
    }
}

/// Payer contact details forwarded to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payer {
    pub phone_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A validated push-payment to start at the provider
#[derive(Debug, Clone)]
pub struct PushPaymentRequest {
    pub amount: BigDecimal,
    pub currency: String,
    pub payer: Payer,
    /// Caller-supplied reference, see [`crate::payments::reference::build_api_ref`]
    pub api_ref: String,
    /// Origin the provider uses for callback routing
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushPaymentResponse {
    pub payment_id: String,
    /// Absent for flows confirmed entirely on the payer's device
    pub checkout_url: Option<String>,
    pub provider_data: Option<JsonValue>,
}

/// Render a decimal as a JSON number, falling back to a string when it does
/// not fit one.
pub fn decimal_to_json(amount: &BigDecimal) -> JsonValue {
    let rendered = if amount.is_integer() {
        amount.with_scale(0).to_string()
    } else {
        amount.to_string()
    };
    match serde_json::Number::from_str(&rendered) {
        Ok(number) => JsonValue::Number(number),
        Err(_) => JsonValue::String(rendered),
    }
}

/// `serialize_with` adapter emitting decimals as JSON numbers
pub fn serialize_amount<S: serde::Serializer>(
    amount: &BigDecimal,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    decimal_to_json(amount).serialize(serializer)
}
