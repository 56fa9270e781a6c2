//! Account endpoints: signup, profiles, discovery.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::application::handlers::account::ProviderListing;
use crate::domain::account::{Client, ClientPatch, NewClient, NewProvider, Provider, ProviderPatch};
use crate::domain::foundation::{ClientId, ProviderId};
use crate::domain::subscription::SubscriptionEntry;

use super::auth::CurrentAccount;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub preferences: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProviderRequest {
    pub business_name: String,
    pub category: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub plan_id: String,
    pub joined_at: String,
}

impl From<&SubscriptionEntry> for SubscriptionView {
    fn from(entry: &SubscriptionEntry) -> Self {
        Self {
            plan_id: entry.plan_id.to_string(),
            joined_at: entry.joined_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub preferences: BTreeSet<String>,
    pub subscriptions: Vec<SubscriptionView>,
    pub has_payment_customer: bool,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.to_string(),
            first_name: client.first_name,
            last_name: client.last_name,
            preferences: client.preferences,
            subscriptions: client.subscriptions.iter().map(SubscriptionView::from).collect(),
            has_payment_customer: client.gateway_customer_id.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub id: String,
    pub business_name: String,
    pub category: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub cover_image: Option<String>,
    pub onboarded: bool,
    pub plan_ids: Vec<String>,
}

impl From<Provider> for ProviderResponse {
    fn from(provider: Provider) -> Self {
        Self {
            id: provider.id.to_string(),
            business_name: provider.business_name,
            category: provider.category,
            bio: provider.bio,
            website: provider.website,
            cover_image: provider.cover_image,
            onboarded: provider.gateway_merchant_id.is_some(),
            plan_ids: provider.plans.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub provider: ProviderResponse,
    pub plans: Vec<super::catalog::PlanResponse>,
}

impl From<ProviderListing> for ListingResponse {
    fn from(listing: ProviderListing) -> Self {
        Self {
            provider: listing.provider.into(),
            plans: listing.plans.into_iter().map(Into::into).collect(),
        }
    }
}

/// POST /api/clients
pub async fn register_client(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(body): Json<RegisterClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ClientId::new(account.account_id)?;
    let client = state
        .register_client_handler()
        .execute(
            id,
            NewClient {
                first_name: body.first_name,
                last_name: body.last_name,
                preferences: body.preferences,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// GET /api/clients/me
pub async fn get_client(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let id = ClientId::new(account.account_id)?;
    let client = state
        .accounts
        .get_client(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Client not found: {id}")))?;
    Ok(Json(ClientResponse::from(client)))
}

/// PATCH /api/clients/me
pub async fn update_client(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(patch): Json<ClientPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ClientId::new(account.account_id)?;
    let client = state.update_profile_handler().update_client(&id, patch).await?;
    Ok(Json(ClientResponse::from(client)))
}

/// GET /api/discover
pub async fn discover(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let id = ClientId::new(account.account_id)?;
    let listings = state.discover_handler().execute(&id).await?;
    let body: Vec<ListingResponse> = listings.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// POST /api/providers
pub async fn register_provider(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(body): Json<RegisterProviderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProviderId::new(account.account_id)?;
    let provider = state
        .register_provider_handler()
        .execute(
            id,
            NewProvider {
                business_name: body.business_name,
                category: body.category,
                bio: body.bio,
                website: body.website,
                cover_image: body.cover_image,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ProviderResponse::from(provider))))
}

/// GET /api/providers/me
pub async fn get_provider(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProviderId::new(account.account_id)?;
    let provider = state
        .accounts
        .get_provider(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Provider not found: {id}")))?;
    Ok(Json(ProviderResponse::from(provider)))
}

/// PATCH /api/providers/me
pub async fn update_provider(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(patch): Json<ProviderPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ProviderId::new(account.account_id)?;
    let provider = state
        .update_profile_handler()
        .update_provider(&id, patch)
        .await?;
    Ok(Json(ProviderResponse::from(provider)))
}
