//! Auth provider collaborator: resolves a bearer token to a verified user

pub mod jwt;
pub mod provider;
pub mod supabase;

pub use jwt::JwtAuthProvider;
pub use provider::{AuthError, AuthProvider, AuthenticatedUser};
pub use supabase::SupabaseAuthProvider;

use axum::http::{header, HeaderMap};

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
