use crate::database::error::DatabaseError;
use crate::payments::types::{serialize_amount, PaymentType};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `transactions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: BigDecimal,
    #[sqlx(rename = "type")]
    pub r#type: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; `user_id` always comes from the verified session
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub payment_type: PaymentType,
    pub date: DateTime<Utc>,
}

/// Append-only access to `transactions`, using a credential that bypasses
/// per-row ownership policies.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction, DatabaseError>;

    /// Newest `date` first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, DatabaseError>;
}
