use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The signature does not recover to a public key.
    #[error("signature recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("MAC construction failed: {0}")]
    Mac(String),

    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}
