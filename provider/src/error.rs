use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider request failed: {0}")]
    RequestFailed(String),

    #[error("provider rejected {operation} with HTTP {status}")]
    Rejected { operation: &'static str, status: u16 },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Unreachable(format!("connection failed: {e}"))
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}
