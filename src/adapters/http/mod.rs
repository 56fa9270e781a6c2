//! HTTP adapter: axum routes over the application handlers.

mod account;
mod auth;
mod billing;
mod catalog;
mod error;
mod state;
mod subscription;

pub use auth::CurrentAccount;
pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, RedirectUrls};

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Requests that outlive this are answered with 408 rather than holding a
/// connection open.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Client accounts.
        .route("/api/clients", post(account::register_client))
        .route(
            "/api/clients/me",
            get(account::get_client).patch(account::update_client),
        )
        .route("/api/discover", get(account::discover))
        // Provider accounts.
        .route("/api/providers", post(account::register_provider))
        .route(
            "/api/providers/me",
            get(account::get_provider).patch(account::update_provider),
        )
        .route("/api/providers/:id/plans", get(catalog::list_provider_plans))
        // Plans.
        .route("/api/plans", post(catalog::create_plan))
        .route(
            "/api/plans/:id",
            get(catalog::get_plan)
                .patch(catalog::update_plan)
                .delete(catalog::delete_plan),
        )
        .route("/api/plans/:id/reconcile", post(subscription::reconcile_plan))
        // Subscriptions.
        .route(
            "/api/subscriptions/:plan_id",
            post(subscription::subscribe).delete(subscription::unsubscribe),
        )
        // Billing.
        .route("/api/billing/onboarding", post(billing::create_onboarding_link))
        .route("/api/billing/setup", post(billing::create_setup_session))
        .route("/api/billing/payment-methods", get(billing::list_payment_methods))
        // Webhooks (no auth; signature verified).
        .route("/webhooks/stripe", post(billing::stripe_webhook))
        .layer(TraceLayer::new_for_http())
        // Bearer-token API; browsers only ever see public responses, so a
        // permissive policy is fine here.
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}
