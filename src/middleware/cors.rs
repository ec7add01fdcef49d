//! Permissive cross-origin headers for browser callers

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Attach the CORS headers every response from the functions carries
pub fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// `OPTIONS` handler: empty 200, no authentication
pub async fn preflight() -> Response {
    let mut headers = HeaderMap::new();
    add_cors_headers(&mut headers);
    (StatusCode::OK, headers).into_response()
}
