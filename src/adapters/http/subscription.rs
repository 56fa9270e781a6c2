//! Subscription lifecycle endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::handlers::subscription::ReconcileReport;
use crate::domain::foundation::{ClientId, PlanId};

use super::auth::CurrentAccount;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub newly_subscribed: bool,
    pub gateway_subscription_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub removed_stale_subscribers: usize,
    pub restored_subscribers: usize,
    pub removed_dangling_entries: usize,
}

impl From<ReconcileReport> for ReconcileResponse {
    fn from(report: ReconcileReport) -> Self {
        Self {
            removed_stale_subscribers: report.removed_stale_subscribers,
            restored_subscribers: report.restored_subscribers,
            removed_dangling_entries: report.removed_dangling_entries,
        }
    }
}

fn parse_plan_id(raw: &str) -> Result<PlanId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Plan not found: {raw}")))
}

/// POST /api/subscriptions/:plan_id
pub async fn subscribe(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let email = account.require_email()?.to_string();
    let client_id = ClientId::new(account.account_id)?;
    let plan_id = parse_plan_id(&plan_id)?;

    let outcome = state
        .coordinator
        .subscribe(&client_id, &plan_id, &email)
        .await?;
    Ok(Json(SubscribeResponse {
        newly_subscribed: outcome.newly_subscribed,
        gateway_subscription_id: outcome.gateway_subscription_id,
    }))
}

/// DELETE /api/subscriptions/:plan_id
pub async fn unsubscribe(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = ClientId::new(account.account_id)?;
    let plan_id = parse_plan_id(&plan_id)?;

    state.coordinator.unsubscribe(&client_id, &plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/plans/:id/reconcile
pub async fn reconcile_plan(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let plan_id = parse_plan_id(&plan_id)?;
    let report = state.coordinator.reconcile_plan(&plan_id).await?;
    Ok(Json(ReconcileResponse::from(report)))
}
