//! Request handlers and wire shapes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use kyc_service::{KycService, Registration, UserStatus, WebhookOutcome};
use kyc_types::{VerificationStatus, WireSignature};

use crate::error::RpcError;

/// Header carrying the webhook HMAC.
pub const SIGNATURE_HEADER: &str = "x-signature";

// ── Users ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPost {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub signature: WireSignature,
}

impl From<UserPost> for Registration {
    fn from(post: UserPost) -> Self {
        Self {
            email: post.email,
            name: post.name,
            last_name: post.last_name,
            signature: post.signature,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub is_verified: bool,
    pub status: VerificationStatus,
}

impl From<UserStatus> for UserStatusResponse {
    fn from(s: UserStatus) -> Self {
        Self {
            is_verified: s.is_verified,
            status: s.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// The path segment must read `0x` followed by hex digits; anything else is
/// not a user route. Length and checksum are checked by the service.
fn address_segment(segment: &str) -> Result<&str, RpcError> {
    match segment.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            Ok(digits)
        }
        _ => Err(RpcError::RouteNotFound(format!("/v1/users/{segment}"))),
    }
}

pub async fn get_user(
    State(service): State<Arc<KycService>>,
    Path(segment): Path<String>,
) -> Result<Json<UserStatusResponse>, RpcError> {
    let status = service.status(address_segment(&segment)?).await?;
    Ok(Json(status.into()))
}

pub async fn register_user(
    State(service): State<Arc<KycService>>,
    Path(segment): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<TokenResponse>), RpcError> {
    let address = address_segment(&segment)?;
    let post: UserPost =
        serde_json::from_slice(&body).map_err(|e| RpcError::MalformedBody(e.to_string()))?;

    let registered = service.register(address, &post.into()).await?;
    let status = if registered.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(TokenResponse {
            token: registered.sdk_token,
        }),
    ))
}

pub async fn request_check(
    State(service): State<Arc<KycService>>,
    Path(segment): Path<String>,
) -> Result<StatusCode, RpcError> {
    let requested = service.request_check(address_segment(&segment)?).await?;
    Ok(if requested.created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    })
}

pub async fn force_accept(
    State(service): State<Arc<KycService>>,
    Path(segment): Path<String>,
    headers: HeaderMap,
) -> Result<Json<UserStatusResponse>, RpcError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    service
        .force_accept(address_segment(&segment)?, token)
        .await?;
    Ok(Json(UserStatusResponse {
        is_verified: true,
        status: VerificationStatus::Accepted,
    }))
}

// ── Webhooks ─────────────────────────────────────────────────────────────

pub async fn provider_webhook(
    State(service): State<Arc<KycService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RpcError> {
    let mac = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    match service.handle_webhook(&body, mac).await? {
        WebhookOutcome::Completed(_) | WebhookOutcome::Ignored { .. } => Ok(StatusCode::OK),
    }
}

// ── Liveness ─────────────────────────────────────────────────────────────

pub async fn health(State(service): State<Arc<KycService>>) -> Result<StatusCode, RpcError> {
    service.health()?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_segment_requires_prefix_and_hex() {
        assert_eq!(address_segment("0xabc123").unwrap(), "abc123");
        assert!(address_segment("abc123").is_err());
        assert!(address_segment("0x").is_err());
        assert!(address_segment("0xabcg").is_err());
    }

    #[test]
    fn user_post_reads_camel_case() {
        let post: UserPost = serde_json::from_str(
            r#"{"email":"a@b.co","name":"A","lastName":"B","signature":{"termsHash":"00","r":"1","s":"2","v":"27"}}"#,
        )
        .unwrap();
        assert_eq!(post.last_name, "B");
        assert_eq!(post.signature.terms_hash, "00");
        assert_eq!(post.signature.v, "27");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let post: UserPost = serde_json::from_str("{}").unwrap();
        assert!(post.email.is_empty());
        assert!(post.signature.r.is_empty());
    }
}
