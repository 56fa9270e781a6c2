//! Stripe adapter for the payment gateway port, plus a scriptable mock used
//! by tests.

mod api_types;
mod gateway;
mod mock_gateway;
mod webhook;

pub use gateway::{StripeConfig, StripeGateway};
pub use mock_gateway::MockGateway;
pub use webhook::verify_signature;
