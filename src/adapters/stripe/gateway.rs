//! Stripe implementation of the payment gateway port.
//!
//! All calls are form-encoded requests authenticated with the secret key.
//! Transport failures and 5xx/429 answers surface as retryable
//! `GatewayError::Unavailable`; any other non-success status is a terminal
//! `GatewayError::Rejected` carrying Stripe's error body.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::Money;
use crate::ports::{
    GatewayError, GatewayEvent, GatewaySubscription, GatewaySubscriptionStatus, PaymentGateway,
    PaymentMethod, RecurringInterval,
};

use super::api_types::{
    StripeAccount, StripeAccountLink, StripeCheckoutSession, StripeCustomer, StripeEvent,
    StripeList, StripePaymentMethod, StripePrice, StripeSubscription,
};
use super::webhook::{verify_signature, SignatureHeader};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,

    /// Upper bound on every API call. A hung connection classifies as
    /// `Unavailable`, the same as any other transport failure.
    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Point the adapter at a different base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, GatewayError> {
        let mut request = self
            .http_client
            .post(self.url(path))
            .timeout(self.config.request_timeout)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .form(params);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http_client
            .get(self.url(path))
            .timeout(self.config.request_timeout)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %body, "Stripe call failed");
            return Err(map_error_status(status, body));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Rejected(format!("failed to parse Stripe response: {e}")))
    }
}

/// Splits non-success statuses into retryable and terminal errors.
fn map_error_status(status: reqwest::StatusCode, body: String) -> GatewayError {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        GatewayError::Unavailable(format!("Stripe returned {status}: {body}"))
    } else {
        GatewayError::Rejected(format!("Stripe API error: {body}"))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_merchant_account(&self, email: &str) -> Result<String, GatewayError> {
        let account: StripeAccount = self
            .post_form(
                "/v1/accounts",
                &[
                    ("type", "express".to_string()),
                    ("email", email.to_string()),
                ],
                None,
            )
            .await?;
        Ok(account.id)
    }

    async fn create_onboarding_link(
        &self,
        merchant_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<String, GatewayError> {
        let link: StripeAccountLink = self
            .post_form(
                "/v1/account_links",
                &[
                    ("account", merchant_id.to_string()),
                    ("refresh_url", refresh_url.to_string()),
                    ("return_url", return_url.to_string()),
                    ("type", "account_onboarding".to_string()),
                ],
                None,
            )
            .await?;
        Ok(link.url)
    }

    async fn create_customer(&self, email: &str) -> Result<String, GatewayError> {
        let customer: StripeCustomer = self
            .post_form("/v1/customers", &[("email", email.to_string())], None)
            .await?;
        Ok(customer.id)
    }

    async fn create_card_setup_session(
        &self,
        customer_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, GatewayError> {
        let session: StripeCheckoutSession = self
            .post_form(
                "/v1/checkout/sessions",
                &[
                    ("mode", "setup".to_string()),
                    ("customer", customer_id.to_string()),
                    ("payment_method_types[0]", "card".to_string()),
                    ("success_url", success_url.to_string()),
                    ("cancel_url", cancel_url.to_string()),
                ],
                None,
            )
            .await?;
        session
            .url
            .ok_or_else(|| GatewayError::Rejected("checkout session has no url".to_string()))
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, GatewayError> {
        let list: StripeList<StripePaymentMethod> = self
            .get(
                "/v1/payment_methods",
                &[("customer", customer_id), ("type", "card")],
            )
            .await?;

        Ok(list
            .data
            .into_iter()
            .filter_map(|pm| {
                pm.card.map(|card| PaymentMethod {
                    id: pm.id,
                    brand: card.brand,
                    last4: card.last4,
                    exp_month: card.exp_month,
                    exp_year: card.exp_year,
                })
            })
            .collect())
    }

    async fn create_recurring_price(
        &self,
        product_name: &str,
        amount: &Money,
        interval: RecurringInterval,
    ) -> Result<String, GatewayError> {
        let price: StripePrice = self
            .post_form(
                "/v1/prices",
                &[
                    ("unit_amount", amount.minor_units().to_string()),
                    ("currency", amount.currency().to_lowercase()),
                    ("recurring[interval]", interval.interval.to_string()),
                    (
                        "recurring[interval_count]",
                        interval.interval_count.to_string(),
                    ),
                    ("product_data[name]", product_name.to_string()),
                ],
                None,
            )
            .await?;
        Ok(price.id)
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        idempotency_key: &str,
    ) -> Result<GatewaySubscription, GatewayError> {
        let sub: StripeSubscription = self
            .post_form(
                "/v1/subscriptions",
                &[
                    ("customer", customer_id.to_string()),
                    ("items[0][price]", price_id.to_string()),
                ],
                Some(idempotency_key),
            )
            .await?;

        let status = match sub.status.as_str() {
            "active" | "trialing" => GatewaySubscriptionStatus::Active,
            "canceled" | "incomplete_expired" => GatewaySubscriptionStatus::Canceled,
            _ => GatewaySubscriptionStatus::Pending,
        };
        Ok(GatewaySubscription { id: sub.id, status })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), GatewayError> {
        let response = self
            .http_client
            .delete(self.url(&format!("/v1/subscriptions/{subscription_id}")))
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, body));
        }
        Ok(())
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "failed to parse signature header");
            GatewayError::InvalidWebhook(e.to_string())
        })?;
        verify_signature(&self.config.webhook_secret, payload, &header)?;

        let event: StripeEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "failed to parse webhook payload");
            GatewayError::InvalidWebhook(format!("invalid JSON: {e}"))
        })?;

        tracing::info!(event_id = %event.id, event_type = %event.event_type, "webhook verified");
        Ok(GatewayEvent {
            id: event.id,
            event_type: event.event_type,
            data: event.data.object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::webhook::hex_encode;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    fn test_gateway() -> StripeGateway {
        StripeGateway::new(StripeConfig::new("sk_test_key", "whsec_test_secret"))
    }

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        let signed_payload = format!("{timestamp}.{payload}");
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        format!("t={timestamp},v1={}", hex_encode(&mac.finalize().into_bytes()))
    }

    #[test]
    fn config_defaults_to_live_base_url() {
        let config = StripeConfig::new("key", "secret");
        assert_eq!(config.api_base_url, "https://api.stripe.com");

        let config = config.with_base_url("http://localhost:12111");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn server_errors_map_to_unavailable() {
        let err = map_error_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert!(err.is_retryable());

        let err = map_error_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(err.is_retryable());

        let err = map_error_status(reqwest::StatusCode::BAD_REQUEST, String::new());
        assert!(!err.is_retryable());
    }

    #[test]
    fn verify_webhook_roundtrip() {
        let gateway = test_gateway();
        let payload = r#"{"id":"evt_1","type":"setup_intent.succeeded","data":{"object":{}}}"#;
        let signature = sign("whsec_test_secret", chrono::Utc::now().timestamp(), payload);

        let event = gateway
            .verify_webhook(payload.as_bytes(), &signature)
            .unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "setup_intent.succeeded");
    }

    #[test]
    fn verify_webhook_rejects_bad_signature() {
        let gateway = test_gateway();
        let payload = r#"{"id":"evt_1","type":"x","data":{"object":{}}}"#;
        let signature = sign("wrong_secret", chrono::Utc::now().timestamp(), payload);

        assert!(gateway
            .verify_webhook(payload.as_bytes(), &signature)
            .is_err());
    }

    #[test]
    fn verify_webhook_rejects_malformed_header() {
        let gateway = test_gateway();
        assert!(gateway.verify_webhook(b"{}", "malformed").is_err());
    }

    #[tokio::test]
    async fn hung_connection_times_out_as_unavailable() {
        // A listener that accepts but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _conn = listener.accept().await;
            std::future::pending::<()>().await;
        });

        let gateway = StripeGateway::new(
            StripeConfig::new("sk_test_key", "whsec_test_secret")
                .with_base_url(format!("http://{addr}"))
                .with_timeout(Duration::from_millis(100)),
        );

        let err = gateway.create_customer("ada@example.com").await.unwrap_err();
        assert!(err.is_retryable(), "timeout must classify as retryable: {err}");
    }
}
