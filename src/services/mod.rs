//! Services module for the payment initiation flow

pub mod payment_processor;
pub mod transaction_recorder;

pub use payment_processor::{
    PaymentInitiated, PaymentProcessor, PaymentRequestBody, ValidatedPayment, DEFAULT_CURRENCY,
};
pub use transaction_recorder::TransactionRecorder;
