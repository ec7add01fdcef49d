//! Failure response formatting
//!
//! Every `AppError` leaves the service as HTTP 500 with
//! `{"success": false, "error": <message>}`. The error kind only shows up in
//! the logs.

use crate::error::AppError;
use crate::middleware::cors::add_cors_headers;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

impl FailureResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.message().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            kind = %self.kind(),
            error = %self,
            "Request failed"
        );

        let mut headers = HeaderMap::new();
        add_cors_headers(&mut headers);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            Json(FailureResponse::from_app_error(&self)),
        )
            .into_response()
    }
}
