//! Static token map for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::ports::{AuthError, AuthProvider, AuthenticatedAccount};

/// [`AuthProvider`] backed by a fixed token table.
#[derive(Debug, Default)]
pub struct MockAuthProvider {
    tokens: HashMap<String, AuthenticatedAccount>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token that verifies to the given account.
    pub fn with_token(
        mut self,
        token: impl Into<String>,
        account_id: impl Into<String>,
        email: Option<&str>,
    ) -> Self {
        self.tokens.insert(
            token.into(),
            AuthenticatedAccount {
                account_id: account_id.into(),
                email: email.map(String::from),
            },
        );
        self
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedAccount, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}
