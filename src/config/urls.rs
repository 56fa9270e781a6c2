//! Redirect URL configuration

use serde::Deserialize;

use crate::adapters::http::RedirectUrls;

use super::error::ValidationError;

/// Redirect targets for the gateway's hosted onboarding and card-setup flows
#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    /// Frontend base URL the hosted flows return to
    #[serde(default = "default_frontend_base")]
    pub frontend_base: String,
}

impl UrlConfig {
    /// Build the redirect set handed to the payment gateway
    pub fn redirect_urls(&self) -> RedirectUrls {
        let base = self.frontend_base.trim_end_matches('/');
        RedirectUrls {
            onboarding_refresh: format!("{base}/onboarding/refresh"),
            onboarding_return: format!("{base}/onboarding/complete"),
            setup_success: format!("{base}/billing/setup/success"),
            setup_cancel: format!("{base}/billing/setup/cancel"),
        }
    }

    /// Validate redirect URL configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.frontend_base.starts_with("http://") && !self.frontend_base.starts_with("https://")
        {
            return Err(ValidationError::InvalidRedirectUrl);
        }
        Ok(())
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            frontend_base: default_frontend_base(),
        }
    }
}

fn default_frontend_base() -> String {
    "http://localhost:3000".to_string()
}
