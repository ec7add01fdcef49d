//! Payment form state machine
//!
//! Holds what the payer typed, submits it through a [`PaymentFunction`] and
//! reports the outcome through a [`Notifier`]. Rendering is left to the host
//! UI; everything here is plain state.

use crate::client::api::{PaymentFunction, PaymentSubmission, FALLBACK_FAILURE_MESSAGE};
use crate::payments::types::PaymentType;
use crate::services::DEFAULT_CURRENCY;
use bigdecimal::BigDecimal;
use std::sync::Arc;
use tracing::{error, info};

pub const DEFAULT_SUGGESTED_AMOUNT: i64 = 100;
pub const MIN_AMOUNT: i64 = 1;
pub const SUPPORTED_CURRENCIES: [&str; 2] = ["KES", "USD"];

pub const SUCCESS_TITLE: &str = "Payment Initiated";
pub const SUCCESS_DESCRIPTION: &str = "Please complete the payment on your mobile device.";
pub const FAILURE_TITLE: &str = "Payment Failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Toast shown to the payer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Opens a checkout page in a new browsing context
pub trait CheckoutOpener: Send + Sync {
    fn open(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFields {
    pub amount: BigDecimal,
    pub currency: String,
    pub phone_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl PaymentFields {
    fn seeded(suggested_amount: &BigDecimal) -> Self {
        Self {
            amount: suggested_amount.clone(),
            currency: DEFAULT_CURRENCY.to_string(),
            phone_number: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

pub struct PaymentForm {
    payment_type: PaymentType,
    donor_id: Option<String>,
    recipient_id: Option<String>,
    suggested_amount: BigDecimal,
    fields: PaymentFields,
    open: bool,
    loading: bool,
    function: Arc<dyn PaymentFunction>,
    notifier: Arc<dyn Notifier>,
    opener: Arc<dyn CheckoutOpener>,
}

impl PaymentForm {
    pub fn new(
        payment_type: PaymentType,
        function: Arc<dyn PaymentFunction>,
        notifier: Arc<dyn Notifier>,
        opener: Arc<dyn CheckoutOpener>,
    ) -> Self {
        let suggested_amount = BigDecimal::from(DEFAULT_SUGGESTED_AMOUNT);
        Self {
            payment_type,
            donor_id: None,
            recipient_id: None,
            fields: PaymentFields::seeded(&suggested_amount),
            suggested_amount,
            open: false,
            loading: false,
            function,
            notifier,
            opener,
        }
    }

    pub fn with_suggested_amount(mut self, amount: BigDecimal) -> Self {
        self.fields.amount = amount.clone();
        self.suggested_amount = amount;
        self
    }

    pub fn with_donor(mut self, donor_id: impl Into<String>) -> Self {
        self.donor_id = Some(donor_id.into());
        self
    }

    pub fn with_recipient(mut self, recipient_id: impl Into<String>) -> Self {
        self.recipient_id = Some(recipient_id.into());
        self
    }

    pub fn title(&self) -> &'static str {
        match self.payment_type {
            PaymentType::Donation => "Send Donation",
            PaymentType::DeliveryFee => "Pay Delivery Fee",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.payment_type {
            PaymentType::Donation => "Support the community by sending a donation",
            PaymentType::DeliveryFee => "Pay the delivery fee to complete your food request",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.payment_type {
            PaymentType::Donation => "Send Donation",
            PaymentType::DeliveryFee => "Pay Fee",
        }
    }

    pub fn fields(&self) -> &PaymentFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut PaymentFields {
        &mut self.fields
    }

    /// Accepts only the currencies offered in the selector
    pub fn set_currency(&mut self, currency: &str) -> bool {
        if SUPPORTED_CURRENCIES.contains(&currency) {
            self.fields.currency = currency.to_string();
            true
        } else {
            false
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the form unless a submission is in flight
    pub fn cancel(&mut self) {
        if !self.loading {
            self.open = false;
        }
    }

    fn submission(&self) -> PaymentSubmission {
        PaymentSubmission {
            amount: self.fields.amount.clone(),
            currency: self.fields.currency.clone(),
            phone_number: self.fields.phone_number.clone(),
            email: self.fields.email.clone(),
            first_name: self.fields.first_name.clone(),
            last_name: self.fields.last_name.clone(),
            payment_type: self.payment_type,
            donor_id: self.donor_id.clone(),
            recipient_id: self.recipient_id.clone(),
        }
    }

    /// Mirrors the inputs' `required` and `min="1"` constraints; anything
    /// further is validated by the function
    pub fn can_submit(&self) -> bool {
        let fields = &self.fields;
        fields.amount >= BigDecimal::from(MIN_AMOUNT)
            && !fields.currency.is_empty()
            && !fields.phone_number.is_empty()
            && !fields.email.is_empty()
            && !fields.first_name.is_empty()
            && !fields.last_name.is_empty()
    }

    /// Submit the current fields. Returns `true` when the payment was
    /// initiated; a form that fails [`can_submit`](Self::can_submit) is not
    /// sent.
    pub async fn submit(&mut self, access_token: &str) -> bool {
        if !self.can_submit() {
            return false;
        }

        let submission = self.submission();
        let _loading = LoadingGuard::set(&mut self.loading);
        let result = self
            .function
            .process_payment(access_token, &submission)
            .await;

        let initiated = match result {
            Ok(body) => {
                info!(payment_id = %body.payment_id, "Payment initiated from form");
                self.notifier.notify(Notice {
                    title: SUCCESS_TITLE.to_string(),
                    description: SUCCESS_DESCRIPTION.to_string(),
                    variant: NoticeVariant::Default,
                });
                if let Some(url) = body.checkout_url.as_deref().filter(|u| !u.is_empty()) {
                    self.opener.open(url);
                }
                self.open = false;
                self.fields = PaymentFields::seeded(&self.suggested_amount);
                true
            }
            Err(e) => {
                error!(error = %e, "Payment submission failed");
                let message = match e.to_string() {
                    m if m.is_empty() => FALLBACK_FAILURE_MESSAGE.to_string(),
                    m => m,
                };
                self.notifier.notify(Notice {
                    title: FAILURE_TITLE.to_string(),
                    description: message,
                    variant: NoticeVariant::Destructive,
                });
                false
            }
        };

        initiated
    }
}

/// Clears the loading flag on completion and when the submit future is
/// dropped mid-flight
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payments::PaymentSuccessResponse;
    use crate::client::api::ClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedFunction {
        reply: Result<PaymentSuccessResponse, ClientError>,
        calls: Mutex<Vec<PaymentSubmission>>,
    }

    impl ScriptedFunction {
        fn succeeding(checkout_url: Option<&str>) -> Self {
            Self {
                reply: Ok(PaymentSuccessResponse {
                    success: true,
                    payment_id: "PAY-7".to_string(),
                    checkout_url: checkout_url.map(str::to_string),
                    message: "Payment initiated successfully".to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(ClientError::Rejected {
                    message: message.to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentFunction for ScriptedFunction {
        async fn process_payment(
            &self,
            _access_token: &str,
            submission: &PaymentSubmission,
        ) -> Result<PaymentSuccessResponse, ClientError> {
            self.calls.lock().expect("lock").push(submission.clone());
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<Notice>>,
        opened: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.notices.lock().expect("lock").push(notice);
        }
    }

    impl CheckoutOpener for Recorder {
        fn open(&self, url: &str) {
            self.opened.lock().expect("lock").push(url.to_string());
        }
    }

    struct HangingFunction;

    #[async_trait]
    impl PaymentFunction for HangingFunction {
        async fn process_payment(
            &self,
            _access_token: &str,
            _submission: &PaymentSubmission,
        ) -> Result<PaymentSuccessResponse, ClientError> {
            std::future::pending().await
        }
    }

    fn fill(form: &mut PaymentForm) {
        let fields = form.fields_mut();
        fields.phone_number = "+254712345678".to_string();
        fields.email = "jane@example.com".to_string();
        fields.first_name = "Jane".to_string();
        fields.last_name = "Doe".to_string();
    }

    #[test]
    fn starts_with_suggested_amount_and_kes() {
        let recorder = Arc::new(Recorder::default());
        let form = PaymentForm::new(
            PaymentType::Donation,
            Arc::new(ScriptedFunction::succeeding(None)),
            recorder.clone(),
            recorder,
        );
        assert_eq!(form.fields().amount, BigDecimal::from(100));
        assert_eq!(form.fields().currency, "KES");
        assert_eq!(form.title(), "Send Donation");
        assert_eq!(form.submit_label(), "Send Donation");
    }

    #[test]
    fn delivery_fee_copy() {
        let recorder = Arc::new(Recorder::default());
        let form = PaymentForm::new(
            PaymentType::DeliveryFee,
            Arc::new(ScriptedFunction::succeeding(None)),
            recorder.clone(),
            recorder,
        );
        assert_eq!(form.title(), "Pay Delivery Fee");
        assert_eq!(form.submit_label(), "Pay Fee");
        assert_eq!(
            form.description(),
            "Pay the delivery fee to complete your food request"
        );
    }

    #[test]
    fn only_offered_currencies_are_selectable() {
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::Donation,
            Arc::new(ScriptedFunction::succeeding(None)),
            recorder.clone(),
            recorder,
        );
        assert!(form.set_currency("USD"));
        assert!(!form.set_currency("EUR"));
        assert_eq!(form.fields().currency, "USD");
    }

    #[tokio::test]
    async fn incomplete_form_is_not_sent() {
        let function = Arc::new(ScriptedFunction::succeeding(None));
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::Donation,
            function.clone(),
            recorder.clone(),
            recorder.clone(),
        );
        form.open();
        assert!(!form.can_submit());
        assert!(!form.submit("token").await);

        fill(&mut form);
        form.fields_mut().amount = BigDecimal::from(0);
        assert!(!form.can_submit());
        assert!(!form.submit("token").await);

        form.fields_mut().amount = BigDecimal::from(1);
        assert!(form.can_submit());

        assert!(function.calls.lock().expect("lock").is_empty());
        assert!(recorder.notices.lock().expect("lock").is_empty());
        assert!(form.is_open());
    }

    #[tokio::test]
    async fn abandoned_submit_clears_loading() {
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::Donation,
            Arc::new(HangingFunction),
            recorder.clone(),
            recorder,
        );
        form.open();
        fill(&mut form);

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            form.submit("token"),
        )
        .await;
        assert!(outcome.is_err());

        assert!(!form.is_loading());
        form.cancel();
        assert!(!form.is_open());
    }

    #[tokio::test]
    async fn success_notifies_opens_checkout_closes_and_resets() {
        let function = Arc::new(ScriptedFunction::succeeding(Some(
            "https://payment.intasend.com/checkout/PAY-7",
        )));
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::DeliveryFee,
            function.clone(),
            recorder.clone(),
            recorder.clone(),
        )
        .with_suggested_amount(BigDecimal::from(250))
        .with_recipient("2c5e7a0d-1b4f-4e8a-9c3d-6f7a8b9c0d1e");
        form.open();
        fill(&mut form);
        form.set_currency("USD");

        assert!(form.submit("token").await);

        assert!(!form.is_open());
        assert!(!form.is_loading());
        assert_eq!(form.fields(), &PaymentFields::seeded(&BigDecimal::from(250)));

        let notices = recorder.notices.lock().expect("lock");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Payment Initiated");
        assert_eq!(notices[0].variant, NoticeVariant::Default);
        assert_eq!(
            recorder.opened.lock().expect("lock").as_slice(),
            ["https://payment.intasend.com/checkout/PAY-7".to_string()]
        );

        let calls = function.calls.lock().expect("lock");
        assert_eq!(calls[0].payment_type, PaymentType::DeliveryFee);
        assert_eq!(calls[0].currency, "USD");
        assert_eq!(
            calls[0].recipient_id.as_deref(),
            Some("2c5e7a0d-1b4f-4e8a-9c3d-6f7a8b9c0d1e")
        );
    }

    #[tokio::test]
    async fn success_without_checkout_url_opens_nothing() {
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::Donation,
            Arc::new(ScriptedFunction::succeeding(None)),
            recorder.clone(),
            recorder.clone(),
        );
        form.open();
        fill(&mut form);

        assert!(form.submit("token").await);
        assert!(recorder.opened.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_form_open_with_fields() {
        let recorder = Arc::new(Recorder::default());
        let mut form = PaymentForm::new(
            PaymentType::Donation,
            Arc::new(ScriptedFunction::failing("IntaSend API error: Invalid phone number")),
            recorder.clone(),
            recorder.clone(),
        );
        form.open();
        fill(&mut form);
        let before = form.fields().clone();

        assert!(!form.submit("token").await);

        assert!(form.is_open());
        assert!(!form.is_loading());
        assert_eq!(form.fields(), &before);

        let notices = recorder.notices.lock().expect("lock");
        assert_eq!(notices[0].title, "Payment Failed");
        assert_eq!(notices[0].description, "IntaSend API error: Invalid phone number");
        assert_eq!(notices[0].variant, NoticeVariant::Destructive);
        assert!(recorder.opened.lock().expect("lock").is_empty());
    }
}
