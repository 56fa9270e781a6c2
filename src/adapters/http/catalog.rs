//! Plan endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{BillingCycle, NewPlan, Plan, PlanPatch};
use crate::domain::foundation::{Money, PlanId, ProviderId};

use super::auth::CurrentAccount;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal price string, e.g. "10.00".
    pub price: String,
    /// ISO currency code, e.g. "CAD".
    pub currency: String,
    /// "monthly", "annually", or "N weeks".
    pub billing_cycle: BillingCycle,
    #[serde(default)]
    pub grace_period_days: u32,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: String,
    pub provider_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub billing_cycle: BillingCycle,
    pub grace_period_days: u32,
    pub priced: bool,
    pub subscriber_count: usize,
    pub created_at: String,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id.to_string(),
            provider_id: plan.provider_id.to_string(),
            title: plan.title,
            description: plan.description,
            price: plan.price,
            billing_cycle: plan.billing_cycle,
            grace_period_days: plan.grace_period_days,
            priced: plan.gateway_price_id.is_some(),
            subscriber_count: plan.subscribers.len(),
            created_at: plan.created_at.as_datetime().to_rfc3339(),
        }
    }
}

fn parse_plan_id(raw: &str) -> Result<PlanId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Plan not found: {raw}")))
}

/// POST /api/plans
pub async fn create_plan(
    State(state): State<AppState>,
    account: CurrentAccount,
    Json(body): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let provider_id = ProviderId::new(account.account_id)?;
    let price = Money::parse_decimal(&body.price, body.currency)?;
    let plan = state
        .create_plan_handler()
        .execute(
            &provider_id,
            NewPlan {
                title: body.title,
                description: body.description,
                price,
                billing_cycle: body.billing_cycle,
                grace_period_days: body.grace_period_days,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PlanResponse::from(plan))))
}

/// GET /api/plans/:id
pub async fn get_plan(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let plan_id = parse_plan_id(&id)?;
    let plan = state
        .catalog
        .get_plan(&plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Plan not found: {plan_id}")))?;
    Ok(Json(PlanResponse::from(plan)))
}

/// GET /api/providers/:id/plans
pub async fn list_provider_plans(
    State(state): State<AppState>,
    _account: CurrentAccount,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let provider_id = ProviderId::new(id)?;
    let plans = state.catalog.list_plans_by_provider(&provider_id).await?;
    let body: Vec<PlanResponse> = plans.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// PATCH /api/plans/:id
pub async fn update_plan(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(id): Path<String>,
    Json(patch): Json<PlanPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let provider_id = ProviderId::new(account.account_id)?;
    let plan_id = parse_plan_id(&id)?;
    let plan = state
        .update_plan_handler()
        .execute(&provider_id, &plan_id, patch)
        .await?;
    Ok(Json(PlanResponse::from(plan)))
}

/// DELETE /api/plans/:id
pub async fn delete_plan(
    State(state): State<AppState>,
    account: CurrentAccount,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let provider_id = ProviderId::new(account.account_id)?;
    let plan_id = parse_plan_id(&id)?;
    state
        .delete_plan_handler()
        .execute(&provider_id, &plan_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
