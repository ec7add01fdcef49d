use crate::payments::error::PaymentResult;
use crate::payments::types::{ProviderName, PushPaymentRequest, PushPaymentResponse};
use async_trait::async_trait;

/// A mobile-money provider able to start a push-payment prompt on the payer's phone.
///
/// Implementations make exactly one outbound call per invocation and never retry.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn initiate_push_payment(
        &self,
        request: PushPaymentRequest,
    ) -> PaymentResult<PushPaymentResponse>;

    fn name(&self) -> ProviderName;
}
