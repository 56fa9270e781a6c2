//! Request authentication extractor.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;

/// The authenticated account behind the current request.
///
/// Extracted from the `Authorization: Bearer <token>` header and verified by
/// the configured auth provider. The same account id keys both client and
/// provider documents; which one applies is decided per endpoint.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account_id: String,
    pub email: Option<String>,
}

impl CurrentAccount {
    /// Email address, required by gateway flows that create customer or
    /// merchant objects.
    pub fn require_email(&self) -> Result<&str, ApiError> {
        self.email
            .as_deref()
            .ok_or_else(|| ApiError::unauthorized("token has no email claim"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

        let account = state.auth.verify_token(token).await?;
        Ok(CurrentAccount {
            account_id: account.account_id,
            email: account.email,
        })
    }
}
