//! Payment initiation flow
//!
//! Authenticate the caller, validate the body, ask the gateway for a mobile
//! push prompt, then record the transaction against the verified user. The
//! first failing step ends the request; there are no retries and no
//! compensation once the prompt has been dispatched.

use crate::auth::{AuthProvider, AuthenticatedUser};
use crate::database::Transaction;
use crate::error::{AppError, AppResult, MISSING_FIELDS_MESSAGE};
use crate::logging::{mask_email, mask_phone_number};
use crate::payments::reference::build_api_ref;
use crate::payments::types::{Payer, PaymentType, PushPaymentRequest};
use crate::payments::PaymentProvider;
use crate::services::transaction_recorder::TransactionRecorder;
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CURRENCY: &str = "KES";

/// Request body as sent by the payment form. Every field is optional here so
/// that absence is reported as a validation failure rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequestBody {
    #[serde(default)]
    pub amount: Option<JsonValue>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub donor_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

/// Body that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayment {
    pub amount: BigDecimal,
    pub currency: String,
    pub payer: Payer,
    pub payment_type: PaymentType,
    pub donor_id: Option<String>,
    pub recipient_id: Option<String>,
}

/// Outcome of a fully successful request
#[derive(Debug, Clone)]
pub struct PaymentInitiated {
    pub payment_id: String,
    pub checkout_url: Option<String>,
    pub transaction: Transaction,
}

/// Non-empty, compared without trimming
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

const MAX_AMOUNT_TEXT_LEN: usize = 64;
const MAX_AMOUNT_INTEGER_DIGITS: i64 = 15;
const MAX_AMOUNT_SCALE: i64 = 18;

/// Rejects exponents and digit counts no payment can have, before anything
/// expands the value to its full decimal form
fn amount_in_range(amount: &BigDecimal) -> bool {
    let (_, scale) = amount.as_bigint_and_exponent();
    let integer_digits = amount.digits() as i64 - scale;
    scale <= MAX_AMOUNT_SCALE && integer_digits <= MAX_AMOUNT_INTEGER_DIGITS
}

/// `None` for the values a form submits when the amount is left blank
fn parse_amount(value: Option<JsonValue>) -> AppResult<Option<BigDecimal>> {
    let raw = match value {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => return Ok(None),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(_) => return Err(AppError::invalid_request("Invalid amount")),
    };

    if raw.len() > MAX_AMOUNT_TEXT_LEN {
        return Err(AppError::invalid_request("Invalid amount"));
    }
    let amount =
        BigDecimal::from_str(&raw).map_err(|_| AppError::invalid_request("Invalid amount"))?;
    if amount.is_zero() {
        return Ok(None);
    }
    if !amount_in_range(&amount) {
        return Err(AppError::invalid_request("Invalid amount"));
    }
    Ok(Some(amount))
}

impl PaymentRequestBody {
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::invalid_request(format!("Invalid request body: {}", e)))
    }

    pub fn validate(self) -> AppResult<ValidatedPayment> {
        let amount = parse_amount(self.amount)?;
        let phone_number = present(self.phone_number);
        let email = present(self.email);
        let first_name = present(self.first_name);
        let last_name = present(self.last_name);

        let (Some(amount), Some(phone_number), Some(email), Some(first_name), Some(last_name)) =
            (amount, phone_number, email, first_name, last_name)
        else {
            return Err(AppError::invalid_request(MISSING_FIELDS_MESSAGE));
        };

        if amount < BigDecimal::zero() {
            return Err(AppError::invalid_request("Amount must be greater than zero"));
        }

        let payment_type = present(self.payment_type)
            .ok_or_else(|| AppError::invalid_request(MISSING_FIELDS_MESSAGE))?
            .parse::<PaymentType>()
            .map_err(|_| AppError::invalid_request("Invalid payment_type"))?;

        let currency = present(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(ValidatedPayment {
            amount,
            currency,
            payer: Payer {
                phone_number,
                email,
                first_name,
                last_name,
            },
            payment_type,
            donor_id: present(self.donor_id),
            recipient_id: present(self.recipient_id),
        })
    }
}

pub struct PaymentProcessor {
    auth: Arc<dyn AuthProvider>,
    gateway: Arc<dyn PaymentProvider>,
    recorder: TransactionRecorder,
    default_host: String,
}

impl PaymentProcessor {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        gateway: Arc<dyn PaymentProvider>,
        recorder: TransactionRecorder,
        default_host: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            gateway,
            recorder,
            default_host: default_host.into(),
        }
    }

    /// Resolve the caller from the bearer token
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthenticatedUser> {
        let Some(token) = token else {
            debug!("Request without bearer token");
            return Err(AppError::unauthenticated());
        };

        match self.auth.resolve_user(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                debug!("Bearer token did not resolve to a user");
                Err(AppError::unauthenticated())
            }
            Err(e) => {
                warn!(error = %e, "Auth provider lookup failed");
                Err(e.into())
            }
        }
    }

    /// Run the whole flow for one request.
    ///
    /// `origin` is the caller's `Origin` header, forwarded to the gateway as
    /// the callback host.
    pub async fn process(
        &self,
        token: Option<&str>,
        origin: Option<&str>,
        body: &[u8],
    ) -> AppResult<PaymentInitiated> {
        let user = self.authenticate(token).await?;

        let payment = PaymentRequestBody::parse(body)?.validate()?;
        if payment.donor_id.is_some() || payment.recipient_id.is_some() {
            // informational only; the row is always owned by the caller
            debug!(
                user_id = %user.id,
                donor_id = ?payment.donor_id,
                recipient_id = ?payment.recipient_id,
                "Payment references counterparties"
            );
        }

        let requested_at = Utc::now();
        let api_ref = build_api_ref(payment.payment_type, requested_at);
        let host = origin
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(self.default_host.as_str())
            .to_string();

        info!(
            user_id = %user.id,
            api_ref = %api_ref,
            payment_type = %payment.payment_type,
            amount = %payment.amount,
            currency = %payment.currency,
            phone_number = %mask_phone_number(&payment.payer.phone_number),
            email = %mask_email(&payment.payer.email),
            "Initiating payment"
        );

        let request = PushPaymentRequest {
            amount: payment.amount.clone(),
            currency: payment.currency.clone(),
            payer: payment.payer.clone(),
            api_ref: api_ref.clone(),
            host,
        };

        let response = self
            .gateway
            .initiate_push_payment(request)
            .await
            .map_err(|e| {
                error!(
                    user_id = %user.id,
                    api_ref = %api_ref,
                    provider = %self.gateway.name(),
                    error = %e,
                    "Payment gateway call failed"
                );
                AppError::from(e)
            })?;

        let transaction = self
            .recorder
            .record(&user, &payment.amount, payment.payment_type, requested_at)
            .await
            .map_err(|e| {
                // the push prompt is already on the payer's phone at this point
                error!(
                    user_id = %user.id,
                    payment_id = %response.payment_id,
                    api_ref = %api_ref,
                    "Payment dispatched but transaction was not recorded"
                );
                e
            })?;

        info!(
            user_id = %user.id,
            payment_id = %response.payment_id,
            transaction_id = %transaction.id,
            "Payment initiated"
        );

        Ok(PaymentInitiated {
            payment_id: response.payment_id,
            checkout_url: response.checkout_url,
            transaction,
        })
    }

    /// Transactions recorded for the caller
    pub async fn transactions(&self, token: Option<&str>) -> AppResult<Vec<Transaction>> {
        let user = self.authenticate(token).await?;
        let transactions = self.recorder.history(&user).await?;
        debug!(user_id = %user.id, count = transactions.len(), "Loaded transaction history");
        Ok(transactions)
    }
}
