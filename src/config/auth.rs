//! Authentication configuration

use secrecy::SecretString;
use serde::Deserialize;

use crate::adapters::auth::JwtConfig;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration (shared-secret JWT)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the identity provider
    pub jwt_secret: String,

    /// Expected issuer claim
    pub jwt_issuer: String,

    /// Expected audience claim
    pub jwt_audience: String,
}

impl AuthConfig {
    /// Build the JWT validator configuration
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: SecretString::new(self.jwt_secret.clone()),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
        }
    }

    /// Validate authentication configuration
    ///
    /// In production, requires HTTPS for the issuer URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        if self.jwt_issuer.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_ISSUER"));
        }
        if self.jwt_audience.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_AUDIENCE"));
        }
        if *environment == Environment::Production && !self.jwt_issuer.starts_with("https://") {
            return Err(ValidationError::IssuerMustBeHttps);
        }
        Ok(())
    }
}
