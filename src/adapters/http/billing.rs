//! Billing endpoints: onboarding, card setup, stored cards, webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{ClientId, ProviderId};
use crate::ports::PaymentMethod;

use super::auth::CurrentAccount;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SetupSessionResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodResponse {
    pub id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(pm: PaymentMethod) -> Self {
        Self {
            id: pm.id,
            brand: pm.brand,
            last4: pm.last4,
            exp_month: pm.exp_month,
            exp_year: pm.exp_year,
        }
    }
}

/// POST /api/billing/onboarding
pub async fn create_onboarding_link(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let email = account.require_email()?.to_string();
    let provider_id = ProviderId::new(account.account_id)?;

    let link = state
        .onboard_provider_handler()
        .execute(
            &provider_id,
            &email,
            &state.redirect_urls.onboarding_refresh,
            &state.redirect_urls.onboarding_return,
        )
        .await?;
    Ok(Json(OnboardingResponse { url: link.url }))
}

/// POST /api/billing/setup
pub async fn create_setup_session(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let email = account.require_email()?.to_string();
    let client_id = ClientId::new(account.account_id)?;

    let url = state
        .setup_payment_handler()
        .execute(
            &client_id,
            &email,
            &state.redirect_urls.setup_success,
            &state.redirect_urls.setup_cancel,
        )
        .await?;
    Ok(Json(SetupSessionResponse { url }))
}

/// GET /api/billing/payment-methods
pub async fn list_payment_methods(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = ClientId::new(account.account_id)?;
    let methods = state.payment_methods_handler().execute(&client_id).await?;
    let body: Vec<PaymentMethodResponse> = methods.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// POST /webhooks/stripe
///
/// No bearer auth; the signature header authenticates the gateway.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing Stripe-Signature header"))?;

    state.webhook_handler().execute(&body, signature)?;
    Ok(StatusCode::OK)
}
