use thiserror::Error;

/// Failures talking to the chain. A contract answering "invalid" is not an error.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("RPC request failed: {0}")]
    RequestFailed(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}
