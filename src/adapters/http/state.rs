//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::handlers::account::{
    DiscoverProvidersHandler, RegisterClientHandler, RegisterProviderHandler, UpdateProfileHandler,
};
use crate::application::handlers::billing::{
    OnboardProviderHandler, PaymentMethodsHandler, SetupPaymentHandler, WebhookHandler,
};
use crate::application::handlers::catalog::{
    CreatePlanHandler, DeletePlanHandler, UpdatePlanHandler,
};
use crate::application::handlers::subscription::SubscriptionCoordinator;
use crate::ports::{AccountStore, AuthProvider, CatalogStore, PaymentGateway};

/// Redirect targets handed to the gateway's hosted flows.
#[derive(Debug, Clone)]
pub struct RedirectUrls {
    pub onboarding_refresh: String,
    pub onboarding_return: String,
    pub setup_success: String,
    pub setup_cancel: String,
}

/// Arc-wrapped dependencies, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub auth: Arc<dyn AuthProvider>,
    pub coordinator: Arc<SubscriptionCoordinator>,
    pub redirect_urls: Arc<RedirectUrls>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        accounts: Arc<dyn AccountStore>,
        gateway: Arc<dyn PaymentGateway>,
        auth: Arc<dyn AuthProvider>,
        redirect_urls: RedirectUrls,
    ) -> Self {
        let coordinator = Arc::new(SubscriptionCoordinator::new(
            catalog.clone(),
            accounts.clone(),
            gateway.clone(),
        ));
        Self {
            catalog,
            accounts,
            gateway,
            auth,
            coordinator,
            redirect_urls: Arc::new(redirect_urls),
        }
    }

    // Handlers are created on demand from the shared dependencies.

    pub fn register_client_handler(&self) -> RegisterClientHandler {
        RegisterClientHandler::new(self.accounts.clone())
    }

    pub fn register_provider_handler(&self) -> RegisterProviderHandler {
        RegisterProviderHandler::new(self.accounts.clone())
    }

    pub fn update_profile_handler(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.accounts.clone())
    }

    pub fn discover_handler(&self) -> DiscoverProvidersHandler {
        DiscoverProvidersHandler::new(self.catalog.clone(), self.accounts.clone())
    }

    pub fn create_plan_handler(&self) -> CreatePlanHandler {
        CreatePlanHandler::new(self.catalog.clone(), self.accounts.clone())
    }

    pub fn update_plan_handler(&self) -> UpdatePlanHandler {
        UpdatePlanHandler::new(self.catalog.clone())
    }

    pub fn delete_plan_handler(&self) -> DeletePlanHandler {
        DeletePlanHandler::new(self.catalog.clone(), self.accounts.clone())
    }

    pub fn onboard_provider_handler(&self) -> OnboardProviderHandler {
        OnboardProviderHandler::new(self.accounts.clone(), self.gateway.clone())
    }

    pub fn setup_payment_handler(&self) -> SetupPaymentHandler {
        SetupPaymentHandler::new(self.accounts.clone(), self.gateway.clone())
    }

    pub fn payment_methods_handler(&self) -> PaymentMethodsHandler {
        PaymentMethodsHandler::new(self.accounts.clone(), self.gateway.clone())
    }

    pub fn webhook_handler(&self) -> WebhookHandler {
        WebhookHandler::new(self.gateway.clone())
    }
}
