use crate::auth::AuthenticatedUser;
use crate::database::{NewTransaction, Transaction, TransactionStore};
use crate::error::{AppError, AppResult};
use crate::payments::types::PaymentType;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Writes the authoritative transaction row for a successful gateway call.
///
/// The row's `user_id` is the verified caller; nothing from the request body
/// can change it.
#[derive(Clone)]
pub struct TransactionRecorder {
    store: Arc<dyn TransactionStore>,
}

impl TransactionRecorder {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        user: &AuthenticatedUser,
        amount: &BigDecimal,
        payment_type: PaymentType,
        at: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let new_transaction = NewTransaction {
            user_id: user.id,
            amount: amount.clone(),
            payment_type,
            date: at,
        };

        match self.store.insert(&new_transaction).await {
            Ok(transaction) => {
                info!(
                    transaction_id = %transaction.id,
                    user_id = %transaction.user_id,
                    r#type = %transaction.r#type,
                    amount = %transaction.amount,
                    "Transaction recorded"
                );
                Ok(transaction)
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Database error while recording transaction");
                Err(AppError::persistence(format!(
                    "Failed to record transaction: {}",
                    e.message()
                )))
            }
        }
    }

    /// Caller's transactions, newest first
    pub async fn history(&self, user: &AuthenticatedUser) -> AppResult<Vec<Transaction>> {
        self.store.list_for_user(user.id).await.map_err(|e| {
            error!(user_id = %user.id, error = %e, "Database error while loading transactions");
            AppError::persistence(format!("Failed to load transactions: {}", e.message()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::error::{DatabaseError, DatabaseErrorKind};
    use crate::error::AppErrorKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<NewTransaction>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl TransactionStore for MemoryStore {
        async fn insert(&self, t: &NewTransaction) -> Result<Transaction, DatabaseError> {
            if let Some(message) = &self.fail_with {
                return Err(DatabaseError::new(DatabaseErrorKind::Query {
                    message: message.clone(),
                }));
            }
            self.rows.lock().expect("lock").push(t.clone());
            Ok(Transaction {
                id: Uuid::new_v4(),
                user_id: t.user_id,
                amount: t.amount.clone(),
                r#type: t.payment_type.as_str().to_string(),
                date: t.date,
                created_at: t.date,
            })
        }

        async fn list_for_user(&self, _user_id: Uuid) -> Result<Vec<Transaction>, DatabaseError> {
            Ok(Vec::new())
        }
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn records_row_for_verified_user() {
        let store = Arc::new(MemoryStore::default());
        let recorder = TransactionRecorder::new(store.clone());
        let caller = user();
        let at = Utc::now();

        let transaction = recorder
            .record(&caller, &BigDecimal::from(50), PaymentType::Donation, at)
            .await
            .expect("record should succeed");

        assert_eq!(transaction.user_id, caller.id);
        assert_eq!(transaction.r#type, "donation");
        assert_eq!(transaction.date, at);
        assert_eq!(store.rows.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn store_failure_becomes_persistence_error() {
        let store = Arc::new(MemoryStore {
            fail_with: Some("permission denied for table transactions".to_string()),
            ..MemoryStore::default()
        });
        let recorder = TransactionRecorder::new(store);

        let err = recorder
            .record(&user(), &BigDecimal::from(10), PaymentType::DeliveryFee, Utc::now())
            .await
            .expect_err("record should fail");

        assert_eq!(err.kind(), AppErrorKind::PersistenceError);
        assert_eq!(
            err.message(),
            "Failed to record transaction: permission denied for table transactions"
        );
    }
}
