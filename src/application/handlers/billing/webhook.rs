//! Gateway webhook intake.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::subscription::SubscriptionError;
use crate::ports::{GatewayEvent, PaymentGateway};

/// Verifies and records incoming gateway events.
///
/// Verification failures surface as rejections so the gateway retries with a
/// correct signature rather than treating the event as delivered. Unhandled
/// event types are acknowledged and logged; the gateway should not redeliver
/// events we deliberately ignore.
pub struct WebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl WebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub fn execute(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, SubscriptionError> {
        let event = self.gateway.verify_webhook(payload, signature)?;

        match event.event_type.as_str() {
            "setup_intent.succeeded" => {
                info!(event_id = %event.id, "card setup completed");
            }
            "invoice.payment_failed" => {
                warn!(event_id = %event.id, "recurring payment failed");
            }
            "customer.subscription.deleted" => {
                info!(event_id = %event.id, "gateway subscription ended");
            }
            other => {
                info!(event_id = %event.id, event_type = %other, "unhandled gateway event");
            }
        }

        Ok(event)
    }
}
