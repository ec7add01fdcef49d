//! Provider reference (`api_ref`) construction

use crate::payments::types::PaymentType;
use chrono::{DateTime, Utc};

/// `{payment_type}_{unix_millis}`, e.g. `donation_1718000000000`.
///
/// Two requests of the same type within one millisecond share a reference.
pub fn build_api_ref(payment_type: PaymentType, at: DateTime<Utc>) -> String {
    format!("{}_{}", payment_type.as_str(), at.timestamp_millis())
}
