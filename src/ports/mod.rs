//! Ports - trait boundaries between the application core and the outside
//! world. Adapters implement these; handlers depend only on the traits.

mod account_store;
mod auth_provider;
mod catalog_store;
mod payment_gateway;

pub use account_store::AccountStore;
pub use auth_provider::{AuthError, AuthProvider, AuthenticatedAccount};
pub use catalog_store::CatalogStore;
pub use payment_gateway::{
    GatewayError, GatewayEvent, GatewaySubscription, GatewaySubscriptionStatus, PaymentGateway,
    PaymentMethod, RecurringInterval,
};
