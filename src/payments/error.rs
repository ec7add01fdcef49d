use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Provider credentials or settings are missing
    #[error("{message}")]
    Configuration { message: String },

    #[error("{provider} request failed: {message}")]
    NetworkError { provider: String, message: String },

    /// Non-success HTTP status from the provider
    #[error("{provider} API error: {message}")]
    ProviderError {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse { provider: String, message: String },
}

impl From<PaymentError> for crate::error::AppError {
    fn from(err: PaymentError) -> Self {
        use crate::error::AppError;

        match err {
            PaymentError::Configuration { .. } => AppError::invalid_request(err.to_string()),
            PaymentError::NetworkError { .. }
            | PaymentError::ProviderError { .. }
            | PaymentError::MalformedResponse { .. } => AppError::gateway(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppErrorKind};

    #[test]
    fn provider_error_message_carries_provider_text() {
        let err = PaymentError::ProviderError {
            provider: "IntaSend".to_string(),
            message: "Invalid phone number".to_string(),
            status: Some(400),
        };
        assert_eq!(err.to_string(), "IntaSend API error: Invalid phone number");

        let app: AppError = err.into();
        assert_eq!(app.kind(), AppErrorKind::GatewayError);
        assert_eq!(app.message(), "IntaSend API error: Invalid phone number");
    }

    #[test]
    fn missing_credentials_map_to_invalid_request() {
        let app: AppError = PaymentError::Configuration {
            message: "IntaSend credentials not configured".to_string(),
        }
        .into();
        assert_eq!(app.kind(), AppErrorKind::InvalidRequest);
        assert_eq!(app.message(), "IntaSend credentials not configured");
    }

    #[test]
    fn malformed_response_maps_to_gateway_error() {
        let app: AppError = PaymentError::MalformedResponse {
            provider: "IntaSend".to_string(),
            message: "missing payment identifier".to_string(),
        }
        .into();
        assert_eq!(app.kind(), AppErrorKind::GatewayError);
    }
}
