//! API error translation.
//!
//! Domain errors keep their own taxonomies; only this boundary decides HTTP
//! statuses and wire codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::account::AccountError;
use crate::domain::catalog::CatalogError;
use crate::domain::foundation::{StoreError, ValidationError};
use crate::domain::subscription::SubscriptionError;
use crate::ports::AuthError;

/// JSON error body: a stable machine code plus a human message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// An error ready to be sent to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::AlreadyExists { .. } => {
                ApiError::new(StatusCode::CONFLICT, "ALREADY_EXISTS", err.to_string())
            }
            StoreError::InvalidDocument { .. } | StoreError::Backend(_) => {
                tracing::error!(error = %err, "store failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "internal storage error",
                )
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::PlanNotFound(_) | CatalogError::ProviderNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            CatalogError::NotOwner { .. } => {
                ApiError::new(StatusCode::FORBIDDEN, "NOT_OWNER", err.to_string())
            }
            CatalogError::PriceLocked { .. } => {
                ApiError::new(StatusCode::CONFLICT, "PRICE_LOCKED", err.to_string())
            }
            CatalogError::Validation(e) => e.into(),
            CatalogError::Storage(e) => e.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::ClientNotFound(_) | AccountError::ProviderNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            AccountError::AlreadyRegistered(_) => {
                ApiError::new(StatusCode::CONFLICT, "ALREADY_REGISTERED", err.to_string())
            }
            AccountError::Validation(e) => e.into(),
            AccountError::Storage(e) => e.into(),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::ClientNotFound(_) | SubscriptionError::PlanNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            SubscriptionError::GatewayUnavailable(_) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "GATEWAY_UNAVAILABLE",
                err.to_string(),
            ),
            SubscriptionError::GatewayRejected(_) => ApiError::new(
                StatusCode::PAYMENT_REQUIRED,
                "GATEWAY_REJECTED",
                err.to_string(),
            ),
            SubscriptionError::Consistency { .. } => {
                tracing::error!(error = %err, "consistency violation");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONSISTENCY_VIOLATION",
                    err.to_string(),
                )
            }
            SubscriptionError::Validation(e) => e.into(),
            SubscriptionError::Storage(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}
