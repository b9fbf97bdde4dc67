//! HTTP error mapping.
//!
//! Validation failures use the `{"Message", "Key"}` body existing clients
//! parse. Everything else returns `{"error": {"code", "message"}}`; internal
//! and upstream details are logged, never sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kyc_service::ServiceError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("server error: {0}")]
    Server(String),
}

/// Field-level rejection body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Key")]
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl RpcError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Service(e) => match e {
                ServiceError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                ServiceError::ProofRejected(_) | ServiceError::Unauthorized => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
                }
                ServiceError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ServiceError::StateConflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                ServiceError::RpcFailure(_) | ServiceError::Provider(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
                }
                ServiceError::Store(_) | ServiceError::Config(_) | ServiceError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            Self::RouteNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::MalformedBody(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let field_error = match &self {
            Self::Service(ServiceError::Validation { key, message }) => Some(ValidationErrorBody {
                message: message.clone(),
                key: key.clone(),
            }),
            Self::Service(ServiceError::ProofRejected(_)) => Some(ValidationErrorBody {
                message: "Recovered address mismatch".into(),
                key: "address".into(),
            }),
            Self::MalformedBody(detail) => Some(ValidationErrorBody {
                message: detail.clone(),
                key: "body".into(),
            }),
            _ => None,
        };
        if let Some(body) = field_error {
            return (status, Json(body)).into_response();
        }

        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                tracing::warn!(error = %self, "upstream unavailable");
                "An upstream service is unavailable".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: ServiceError) -> StatusCode {
        RpcError::from(e).status_and_code().0
    }

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(
            status_of(ServiceError::validation("email", "is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::ProofRejected("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(ServiceError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ServiceError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ServiceError::NotFound("a".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ServiceError::StateConflict("c".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::RpcFailure("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ServiceError::Config("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServiceError::Internal("entropy".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn route_errors_map_to_statuses() {
        assert_eq!(
            RpcError::RouteNotFound("/x".into()).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RpcError::MalformedBody("eof".into()).status_and_code().0,
            StatusCode::BAD_REQUEST
        );
    }
}
