//! Authentication port: token verification for incoming requests.

use async_trait::async_trait;
use thiserror::Error;

/// The account a verified token belongs to. Account ids come from the
/// authentication collaborator; the stores key client and provider documents
/// by the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: String,
    pub email: Option<String>,
}

/// Token verification failures.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    Expired,
}

/// Boundary for verifying bearer tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verifies a bearer token and returns the account it authenticates.
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedAccount, AuthError>;
}
