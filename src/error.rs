//! Error taxonomy for the payment flow
//!
//! Every failure a request can hit is one of four kinds, each carrying the
//! human-readable message returned to the client. Collaborator errors
//! (auth, gateway, store) convert into these at the service seams.

use std::fmt;

pub const UNAUTHENTICATED_MESSAGE: &str = "User not authenticated";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required payment fields";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// No bearer token, or the token does not resolve to a user
    #[error("{message}")]
    Unauthenticated { message: String },

    /// Missing required field, unparseable body or missing gateway credentials
    #[error("{message}")]
    InvalidRequest { message: String },

    /// Provider HTTP failure or malformed provider response
    #[error("{message}")]
    GatewayError { message: String },

    /// Store write failure after a successful gateway call
    #[error("{message}")]
    PersistenceError { message: String },
}

/// Stable tag for each error kind, used in structured logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppErrorKind {
    Unauthenticated,
    InvalidRequest,
    GatewayError,
    PersistenceError,
}

impl AppErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorKind::Unauthenticated => "unauthenticated",
            AppErrorKind::InvalidRequest => "invalid_request",
            AppErrorKind::GatewayError => "gateway_error",
            AppErrorKind::PersistenceError => "persistence_error",
        }
    }
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::Unauthenticated {
            message: UNAUTHENTICATED_MESSAGE.to_string(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        AppError::GatewayError {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        AppError::PersistenceError {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> AppErrorKind {
        match self {
            AppError::Unauthenticated { .. } => AppErrorKind::Unauthenticated,
            AppError::InvalidRequest { .. } => AppErrorKind::InvalidRequest,
            AppError::GatewayError { .. } => AppErrorKind::GatewayError,
            AppError::PersistenceError { .. } => AppErrorKind::PersistenceError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message }
            | AppError::InvalidRequest { message }
            | AppError::GatewayError { message }
            | AppError::PersistenceError { message } => message,
        }
    }
}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_bare_message() {
        let error = AppError::gateway("IntaSend API error: Invalid phone number");
        assert_eq!(error.to_string(), "IntaSend API error: Invalid phone number");
        assert_eq!(error.message(), "IntaSend API error: Invalid phone number");
    }

    #[test]
    fn test_unauthenticated_message() {
        let error = AppError::unauthenticated();
        assert_eq!(error.to_string(), "User not authenticated");
        assert_eq!(error.kind(), AppErrorKind::Unauthenticated);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            AppError::invalid_request(MISSING_FIELDS_MESSAGE).kind().as_str(),
            "invalid_request"
        );
        assert_eq!(
            AppError::persistence("boom").kind().to_string(),
            "persistence_error"
        );
    }
}
