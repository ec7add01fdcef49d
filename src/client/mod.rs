//! Caller side of `process-payment`: an HTTP client for the function and the
//! payment form state machine that drives it.

pub mod api;
pub mod form;

pub use api::{ClientError, PaymentFunction, PaymentFunctionClient, PaymentSubmission};
pub use form::{CheckoutOpener, Notice, NoticeVariant, Notifier, PaymentFields, PaymentForm};
