//! Top-level error type shared across crates.

use thiserror::Error;

/// Boundary-level parse and validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KycError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid checksum address")]
    InvalidChecksum,

    #[error("invalid {key}: {message}")]
    Validation { key: String, message: String },
}

impl KycError {
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            key: key.into(),
            message: message.into(),
        }
    }

    /// The request field this error refers to, if any.
    pub fn field_key(&self) -> Option<&str> {
        match self {
            Self::InvalidAddress(_) | Self::InvalidChecksum => Some("address"),
            Self::Validation { key, .. } => Some(key),
        }
    }
}
