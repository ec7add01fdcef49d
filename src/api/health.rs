use crate::api::AppState;
use crate::database::health_check;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// `up`, `down`, or `not_configured` when writes go through the REST store
    pub database: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db_pool {
        Some(pool) => match health_check(pool).await {
            Ok(()) => "up",
            Err(e) => {
                error!(error = %e, "Database health check failed");
                "down"
            }
        },
        None => "not_configured",
    };

    let (status_code, status) = if database == "down" {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            database: database.to_string(),
        }),
    )
}
