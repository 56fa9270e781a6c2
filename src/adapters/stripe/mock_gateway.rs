//! Scriptable in-process gateway for tests and offline development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::Money;
use crate::ports::{
    GatewayError, GatewayEvent, GatewaySubscription, GatewaySubscriptionStatus, PaymentGateway,
    PaymentMethod, RecurringInterval,
};

/// In-process [`PaymentGateway`] with call counters, an idempotency map, and
/// one-shot failure injection.
///
/// Reproduces the two gateway behaviors the coordinator leans on: retried
/// `create_subscription` calls with the same idempotency key return the
/// original object, and zero-length billing intervals are rejected.
#[derive(Debug, Default)]
pub struct MockGateway {
    seq: AtomicU64,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    subscriptions_by_key: HashMap<String, GatewaySubscription>,
    payment_methods: HashMap<String, Vec<PaymentMethod>>,
    customer_creates: u64,
    price_creates: u64,
    subscription_creates: u64,
    fail_next_subscription: Option<GatewayError>,
    fail_next_price: Option<GatewayError>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{n}")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // Mutex poisoning only happens if a test panicked mid-call.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Makes the next `create_subscription` call fail with the given error.
    pub fn fail_next_subscription(&self, err: GatewayError) {
        self.lock().fail_next_subscription = Some(err);
    }

    /// Makes the next `create_recurring_price` call fail with the given
    /// error.
    pub fn fail_next_price(&self, err: GatewayError) {
        self.lock().fail_next_price = Some(err);
    }

    /// Stores a card on a customer so `list_payment_methods` returns it.
    pub fn put_payment_method(&self, customer_id: &str, method: PaymentMethod) {
        self.lock()
            .payment_methods
            .entry(customer_id.to_string())
            .or_default()
            .push(method);
    }

    /// Number of customer objects created.
    pub fn customer_creates(&self) -> u64 {
        self.lock().customer_creates
    }

    /// Number of recurring prices created.
    pub fn price_creates(&self) -> u64 {
        self.lock().price_creates
    }

    /// Number of subscription create calls that reached the gateway and
    /// created a new object (idempotent replays not counted).
    pub fn subscription_creates(&self) -> u64 {
        self.lock().subscription_creates
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_merchant_account(&self, _email: &str) -> Result<String, GatewayError> {
        Ok(self.next_id("acct"))
    }

    async fn create_onboarding_link(
        &self,
        merchant_id: &str,
        _refresh_url: &str,
        _return_url: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("https://onboarding.test/{merchant_id}"))
    }

    async fn create_customer(&self, _email: &str) -> Result<String, GatewayError> {
        self.lock().customer_creates += 1;
        Ok(self.next_id("cus"))
    }

    async fn create_card_setup_session(
        &self,
        customer_id: &str,
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("https://checkout.test/setup/{customer_id}"))
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, GatewayError> {
        Ok(self
            .lock()
            .payment_methods
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_recurring_price(
        &self,
        _product_name: &str,
        _amount: &Money,
        interval: RecurringInterval,
    ) -> Result<String, GatewayError> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_price.take() {
            return Err(err);
        }
        if interval.interval_count == 0 {
            return Err(GatewayError::Rejected(
                "interval_count must be at least 1".to_string(),
            ));
        }
        state.price_creates += 1;
        drop(state);
        Ok(self.next_id("price"))
    }

    async fn create_subscription(
        &self,
        _customer_id: &str,
        _price_id: &str,
        idempotency_key: &str,
    ) -> Result<GatewaySubscription, GatewayError> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_subscription.take() {
            return Err(err);
        }
        if let Some(existing) = state.subscriptions_by_key.get(idempotency_key) {
            return Ok(existing.clone());
        }
        state.subscription_creates += 1;
        drop(state);

        let sub = GatewaySubscription {
            id: self.next_id("sub"),
            status: GatewaySubscriptionStatus::Active,
        };
        self.lock()
            .subscriptions_by_key
            .insert(idempotency_key.to_string(), sub.clone());
        Ok(sub)
    }

    async fn cancel_subscription(&self, _subscription_id: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        _signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        let data: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::InvalidWebhook(e.to_string()))?;
        Ok(GatewayEvent {
            id: self.next_id("evt"),
            event_type: data
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("unknown")
                .to_string(),
            data,
        })
    }
}
