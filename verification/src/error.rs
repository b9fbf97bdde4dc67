use thiserror::Error;

use kyc_chain::ChainError;
use kyc_crypto::CryptoError;
use kyc_store::StoreError;
use kyc_types::{Address, KycError, VerificationStatus};

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid {key}: {message}")]
    Validation { key: String, message: String },

    #[error("signature does not prove ownership of {0}")]
    AddressMismatch(Address),

    #[error("signature recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("contract call failed: {0}")]
    RpcFailure(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("check {check_id} is {current}, cannot move to {requested}")]
    StateConflict {
        check_id: String,
        current: VerificationStatus,
        requested: VerificationStatus,
    },

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),
}

impl VerificationError {
    /// Recovery failures and mismatches both mean "this signature is not proof".
    pub fn is_proof_rejection(&self) -> bool {
        matches!(self, Self::AddressMismatch(_) | Self::RecoveryFailed(_))
    }
}

impl From<KycError> for VerificationError {
    fn from(e: KycError) -> Self {
        let key = e.field_key().unwrap_or("request").to_string();
        Self::Validation {
            key,
            message: e.to_string(),
        }
    }
}

impl From<CryptoError> for VerificationError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::RecoveryFailed(reason) => Self::RecoveryFailed(reason),
            other => Self::Crypto(other),
        }
    }
}

impl From<ChainError> for VerificationError {
    fn from(e: ChainError) -> Self {
        Self::RpcFailure(e.to_string())
    }
}

impl From<StoreError> for VerificationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Self::NotFound(key),
            other => Self::Store(other),
        }
    }
}
