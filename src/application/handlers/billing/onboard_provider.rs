//! Gateway onboarding for providers.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::ProviderId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountStore, PaymentGateway};

/// A fresh onboarding link for a provider's merchant account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingLink {
    pub merchant_id: String,
    pub url: String,
}

/// Ensures the provider has a gateway merchant account and mints an
/// onboarding link for it.
///
/// Re-running is safe: an existing merchant account is reused and only a new
/// link is created. Links are single-use on the gateway side.
pub struct OnboardProviderHandler {
    accounts: Arc<dyn AccountStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl OnboardProviderHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { accounts, gateway }
    }

    pub async fn execute(
        &self,
        provider_id: &ProviderId,
        email: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<OnboardingLink, SubscriptionError> {
        let provider = self
            .accounts
            .get_provider(provider_id)
            .await?
            .ok_or_else(|| {
                crate::domain::foundation::StoreError::not_found("provider", provider_id.to_string())
            })?;

        let merchant_id = match provider.gateway_merchant_id {
            Some(id) => id,
            None => {
                let created = self.gateway.create_merchant_account(email).await?;
                if self
                    .accounts
                    .set_merchant_account(provider_id, &created)
                    .await?
                {
                    info!(%provider_id, merchant_id = %created, "merchant account created");
                    created
                } else {
                    // Lost the race; the stored id wins.
                    self.accounts
                        .get_provider(provider_id)
                        .await?
                        .and_then(|p| p.gateway_merchant_id)
                        .unwrap_or(created)
                }
            }
        };

        let url = self
            .gateway
            .create_onboarding_link(&merchant_id, refresh_url, return_url)
            .await?;
        Ok(OnboardingLink { merchant_id, url })
    }
}
