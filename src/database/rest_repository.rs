use crate::database::error::{DatabaseError, DatabaseErrorKind};
use crate::database::repository::{NewTransaction, Transaction, TransactionStore};
use crate::payments::types::decimal_to_json;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

/// Transaction store over the hosted REST endpoint (`/rest/v1`), authenticated
/// with the service-role key.
pub struct RestTransactionRepository {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl RestTransactionRepository {
    pub fn new(base_url: &str, service_role_key: &str) -> Result<Self, DatabaseError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection {
                message: format!("failed to initialize HTTP client: {}", e),
            })
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/transactions", self.base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Transaction>, DatabaseError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection {
                message: e.to_string(),
            })
        })?;

        if !status.is_success() {
            return Err(DatabaseError::new(DatabaseErrorKind::Rest {
                status: status.as_u16(),
                message: rest_error_message(&text),
            }));
        }

        serde_json::from_str::<Vec<Transaction>>(&text).map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Decode {
                message: e.to_string(),
            })
        })
    }
}

/// PostgREST errors carry `message`; fall back to the raw body
fn rest_error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(JsonValue::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl TransactionStore for RestTransactionRepository {
    async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction, DatabaseError> {
        let payload = serde_json::json!({
            "user_id": transaction.user_id,
            "amount": decimal_to_json(&transaction.amount),
            "type": transaction.payment_type.as_str(),
            "date": transaction.date.to_rfc3339(),
        });

        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection {
                    message: e.to_string(),
                })
            })?;

        let mut rows = Self::read_rows(response).await?;
        debug!(rows = rows.len(), "transactions insert returned");
        if rows.is_empty() {
            return Err(DatabaseError::new(DatabaseErrorKind::Decode {
                message: "insert returned no row".to_string(),
            }));
        }
        Ok(rows.remove(0))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, DatabaseError> {
        let url = format!(
            "{}?select=*&user_id=eq.{}&order=date.desc",
            self.table_url(),
            user_id
        );
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection {
                    message: e.to_string(),
                })
            })?;

        Self::read_rows(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::types::PaymentType;
    use bigdecimal::BigDecimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_ID: &str = "7f8c2f0e-54d6-4c57-9a4b-1f1a0c3e2b10";

    fn row() -> JsonValue {
        json!({
            "id": "0b6f5a7e-8d39-4f7c-a1a4-2f3b9c7d6e51",
            "user_id": USER_ID,
            "amount": 50,
            "type": "donation",
            "date": "2026-10-14T09:30:00+00:00",
            "created_at": "2026-10-14T09:30:00.412+00:00"
        })
    }

    #[tokio::test]
    async fn insert_posts_row_with_service_role_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/transactions"))
            .and(header("apikey", "service-role"))
            .and(header("authorization", "Bearer service-role"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({
                "user_id": USER_ID,
                "amount": 50,
                "type": "donation"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row()])))
            .expect(1)
            .mount(&server)
            .await;

        let repo = RestTransactionRepository::new(&server.uri(), "service-role").expect("repo");
        let created = repo
            .insert(&NewTransaction {
                user_id: Uuid::parse_str(USER_ID).expect("uuid"),
                amount: BigDecimal::from(50),
                payment_type: PaymentType::Donation,
                date: chrono::Utc::now(),
            })
            .await
            .expect("insert should succeed");

        assert_eq!(created.r#type, "donation");
        assert_eq!(created.amount, BigDecimal::from(50));
    }

    #[tokio::test]
    async fn insert_failure_carries_store_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/transactions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "23502",
                "message": "null value in column \"amount\" violates not-null constraint"
            })))
            .mount(&server)
            .await;

        let repo = RestTransactionRepository::new(&server.uri(), "service-role").expect("repo");
        let err = repo
            .insert(&NewTransaction {
                user_id: Uuid::parse_str(USER_ID).expect("uuid"),
                amount: BigDecimal::from(50),
                payment_type: PaymentType::DeliveryFee,
                date: chrono::Utc::now(),
            })
            .await
            .expect_err("insert should fail");

        assert_eq!(
            err.message(),
            "null value in column \"amount\" violates not-null constraint"
        );
    }

    #[tokio::test]
    async fn list_filters_by_user_and_orders_by_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/transactions"))
            .and(query_param("user_id", format!("eq.{}", USER_ID)))
            .and(query_param("order", "date.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row()])))
            .expect(1)
            .mount(&server)
            .await;

        let repo = RestTransactionRepository::new(&server.uri(), "service-role").expect("repo");
        let rows = repo
            .list_for_user(Uuid::parse_str(USER_ID).expect("uuid"))
            .await
            .expect("list should succeed");
        assert_eq!(rows.len(), 1);
    }
}
