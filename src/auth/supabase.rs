use crate::auth::provider::{AuthError, AuthProvider, AuthenticatedUser};
use crate::config::SupabaseConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// Resolves tokens by asking the hosted auth server for the session's user
pub struct SupabaseAuthProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
    role: Option<String>,
}

impl SupabaseAuthProvider {
    pub fn new(config: &SupabaseConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::Unavailable {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn resolve_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, AuthError> {
        let response = self
            .client
            .get(self.user_endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                let user: UserPayload =
                    response
                        .json()
                        .await
                        .map_err(|e| AuthError::UnexpectedResponse {
                            message: e.to_string(),
                        })?;
                debug!(user_id = %user.id, "session token resolved");
                Ok(Some(AuthenticatedUser {
                    id: user.id,
                    email: user.email,
                    role: user.role,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!(status = %status, "session token rejected");
                Ok(None)
            }
            _ => {
                warn!(status = %status, "auth server error while resolving token");
                Err(AuthError::Unavailable {
                    message: format!("HTTP {}", status),
                })
            }
        }
    }
}
