use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity established from a verified session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("auth provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("auth provider returned an unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

impl From<AuthError> for crate::error::AppError {
    fn from(_: AuthError) -> Self {
        crate::error::AppError::unauthenticated()
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` when the token is well-formed but does not resolve to a user
    async fn resolve_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, AuthError>;
}
