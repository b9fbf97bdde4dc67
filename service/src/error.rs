use thiserror::Error;

use kyc_provider::ProviderError;
use kyc_store::StoreError;
use kyc_types::KycError;
use kyc_verification::VerificationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid {key}: {message}")]
    Validation { key: String, message: String },

    #[error("ownership proof rejected: {0}")]
    ProofRejected(String),

    #[error("webhook authentication failed")]
    Unauthorized,

    #[error("manual override is not permitted")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("chain RPC failure: {0}")]
    RpcFailure(String),

    #[error("identity provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<KycError> for ServiceError {
    fn from(e: KycError) -> Self {
        Self::validation(e.field_key().unwrap_or("request"), e.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Self::NotFound(key),
            other => Self::Store(other),
        }
    }
}

impl From<VerificationError> for ServiceError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::Validation { key, message } => Self::Validation { key, message },
            VerificationError::AddressMismatch(_) | VerificationError::RecoveryFailed(_) => {
                Self::ProofRejected(e.to_string())
            }
            VerificationError::RpcFailure(msg) => Self::RpcFailure(msg),
            VerificationError::NotFound(key) => Self::NotFound(key),
            VerificationError::StateConflict { .. } => Self::StateConflict(e.to_string()),
            VerificationError::Store(inner) => Self::Store(inner),
            VerificationError::Crypto(inner) => Self::Internal(inner.to_string()),
        }
    }
}
