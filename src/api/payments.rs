//! POST /functions/v1/process-payment

use crate::api::AppState;
use crate::auth::bearer_token;
use crate::error::AppError;
use crate::middleware::cors::add_cors_headers;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SUCCESS_MESSAGE: &str = "Payment initiated successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSuccessResponse {
    pub success: bool,
    pub payment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    pub message: String,
}

/// The body is taken as raw bytes so that a malformed JSON body fails the
/// same way as any other invalid request. A body the extractor refuses
/// (over the size limit, interrupted) becomes an `InvalidRequest` too, after
/// the caller has been authenticated.
pub async fn process_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers);
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.processor.authenticate(token).await?;
            warn!(status = %rejection.status(), "Request body rejected");
            return Err(AppError::invalid_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let initiated = state.processor.process(token, origin, &body).await?;

    let mut response_headers = HeaderMap::new();
    add_cors_headers(&mut response_headers);
    let body = PaymentSuccessResponse {
        success: true,
        payment_id: initiated.payment_id,
        checkout_url: initiated.checkout_url,
        message: SUCCESS_MESSAGE.to_string(),
    };

    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkout_url_is_omitted_when_absent() {
        let body = PaymentSuccessResponse {
            success: true,
            payment_id: "PAY-1".to_string(),
            checkout_url: None,
            message: SUCCESS_MESSAGE.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({
                "success": true,
                "payment_id": "PAY-1",
                "message": "Payment initiated successfully"
            })
        );
    }
}
