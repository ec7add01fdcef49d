//! Payment gateway client: provider trait, wire types and the IntaSend provider

pub mod error;
pub mod provider;
pub mod providers;
pub mod reference;
pub mod types;
pub mod utils;

pub use error::{PaymentError, PaymentResult};
pub use provider::PaymentProvider;
pub use types::{Payer, PaymentType, PushPaymentRequest, PushPaymentResponse};
