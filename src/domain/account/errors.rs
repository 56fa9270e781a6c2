//! Account operation errors.

use thiserror::Error;

use crate::domain::foundation::{ClientId, ProviderId, StoreError, ValidationError};

/// Errors from account registration and profile operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Provider not found: {0}")]
    ProviderNotFound(ProviderId),

    #[error("An account already exists for id {0}")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
