//! JWT bearer-token validation.
//!
//! Accounts authenticate against an external identity provider; this adapter
//! only verifies the tokens it issues. Signature, expiry, issuer, and
//! audience are all checked; the subject claim becomes the account id the
//! stores key documents by.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{AuthError, AuthProvider, AuthenticatedAccount};

/// Configuration for JWT validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret shared with the identity provider.
    pub secret: SecretString,

    /// Expected issuer claim.
    pub issuer: String,

    /// Expected audience claim.
    pub audience: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Shared-secret JWT validator.
pub struct JwtAuthProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        Self {
            decoding_key,
            validation,
        }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedAccount, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(AuthenticatedAccount {
            account_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}
