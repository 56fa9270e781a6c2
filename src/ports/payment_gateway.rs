//! Payment gateway port.
//!
//! Mirrors the small slice of the gateway's API the marketplace needs:
//! merchant onboarding, customers, card setup, recurring prices,
//! subscriptions, and webhook verification.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::catalog::BillingCycle;
use crate::domain::foundation::Money;
use crate::domain::subscription::SubscriptionError;

/// Errors from gateway calls, split by whether a retry can help.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Network failure, timeout, or a 5xx/429 answer. The request may or may
    /// not have reached the gateway.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway understood the request and refused it (4xx). Retrying the
    /// identical request fails the same way.
    #[error("Gateway rejected request: {0}")]
    Rejected(String),

    /// A webhook payload failed signature verification or parsing.
    #[error("Invalid webhook: {0}")]
    InvalidWebhook(String),
}

impl GatewayError {
    /// True when retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}

impl From<GatewayError> for SubscriptionError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(msg) => SubscriptionError::GatewayUnavailable(msg),
            GatewayError::Rejected(msg) | GatewayError::InvalidWebhook(msg) => {
                SubscriptionError::GatewayRejected(msg)
            }
        }
    }
}

/// Billing interval in the gateway's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringInterval {
    /// "month", "year", or "week".
    pub interval: &'static str,
    pub interval_count: u32,
}

impl RecurringInterval {
    /// Maps a billing cycle to the gateway's interval pair.
    ///
    /// Custom week counts become a week interval with that count. A zero
    /// week count is passed through; the gateway rejects it, which is the
    /// desired failure point.
    pub fn from_billing_cycle(cycle: &BillingCycle) -> Self {
        match cycle {
            BillingCycle::Monthly => Self {
                interval: "month",
                interval_count: 1,
            },
            BillingCycle::Annually => Self {
                interval: "year",
                interval_count: 1,
            },
            BillingCycle::CustomWeeks(weeks) => Self {
                interval: "week",
                interval_count: *weeks,
            },
        }
    }
}

/// A stored card, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

/// Status of a gateway subscription object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewaySubscriptionStatus {
    Pending,
    Active,
    Canceled,
}

/// A subscription object as created on the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySubscription {
    pub id: String,
    pub status: GatewaySubscriptionStatus,
}

/// A verified webhook event.
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    pub id: String,
    pub event_type: String,
    pub data: Value,
}

/// Boundary for all payment gateway calls.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a merchant account for a provider. Returns the account id.
    async fn create_merchant_account(&self, email: &str) -> Result<String, GatewayError>;

    /// Creates a one-time onboarding link for a merchant account.
    async fn create_onboarding_link(
        &self,
        merchant_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<String, GatewayError>;

    /// Creates a customer object for a client. Returns the customer id.
    async fn create_customer(&self, email: &str) -> Result<String, GatewayError>;

    /// Creates a hosted card-setup session for a customer. Returns the
    /// session URL the client is redirected to.
    async fn create_card_setup_session(
        &self,
        customer_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, GatewayError>;

    /// Lists the cards stored on a customer.
    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, GatewayError>;

    /// Creates a recurring price. Returns the price id.
    async fn create_recurring_price(
        &self,
        product_name: &str,
        amount: &Money,
        interval: RecurringInterval,
    ) -> Result<String, GatewayError>;

    /// Creates a subscription binding a customer to a price.
    ///
    /// The idempotency key makes retried calls return the original
    /// subscription instead of billing twice.
    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        idempotency_key: &str,
    ) -> Result<GatewaySubscription, GatewayError>;

    /// Cancels a gateway subscription.
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), GatewayError>;

    /// Verifies a webhook signature and parses the event.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_mapping_covers_all_cycles() {
        let m = RecurringInterval::from_billing_cycle(&BillingCycle::Monthly);
        assert_eq!((m.interval, m.interval_count), ("month", 1));

        let y = RecurringInterval::from_billing_cycle(&BillingCycle::Annually);
        assert_eq!((y.interval, y.interval_count), ("year", 1));

        let w = RecurringInterval::from_billing_cycle(&BillingCycle::CustomWeeks(3));
        assert_eq!((w.interval, w.interval_count), ("week", 3));
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(GatewayError::Unavailable("timeout".into()).is_retryable());
        assert!(!GatewayError::Rejected("bad price".into()).is_retryable());
        assert!(!GatewayError::InvalidWebhook("bad sig".into()).is_retryable());
    }
}
