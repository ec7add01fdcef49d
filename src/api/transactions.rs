//! GET /functions/v1/transactions

use crate::api::AppState;
use crate::auth::bearer_token;
use crate::database::Transaction;
use crate::error::AppError;
use crate::middleware::cors::add_cors_headers;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let transactions = state
        .processor
        .transactions(bearer_token(&headers))
        .await?;

    let mut response_headers = HeaderMap::new();
    add_cors_headers(&mut response_headers);
    Ok((
        StatusCode::OK,
        response_headers,
        Json(TransactionsResponse {
            success: true,
            transactions,
        }),
    )
        .into_response())
}
