//! Billing use cases: merchant onboarding, card setup, webhooks.

mod onboard_provider;
mod payment_methods;
mod setup_payment;
mod webhook;

pub use onboard_provider::{OnboardProviderHandler, OnboardingLink};
pub use payment_methods::PaymentMethodsHandler;
pub use setup_payment::SetupPaymentHandler;
pub use webhook::WebhookHandler;
