use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use primitive_types::U256;
use serde_json::Value;
use tower::ServiceExt;

use kyc_crypto::{compute_webhook_mac, keypair_from_seed, sign_digest, terms_hash, to_checksum, KeyPair};
use kyc_nullables::{NullContractClient, NullIdentityProvider, NullStore};
use kyc_rpc::router;
use kyc_service::{KycService, ServiceConfig};
use kyc_types::CheckId;
use kyc_verification::Terms;

const TERMS: &str = "By signing I accept the terms of service.";
const WEBHOOK_SECRET: &str = "webhook-secret";
const OPERATOR_TOKEN: &str = "operator-token";

struct TestApp {
    app: Router,
    store: Arc<NullStore>,
    provider: Arc<NullIdentityProvider>,
}

fn test_app_with(config: ServiceConfig) -> TestApp {
    let store = Arc::new(NullStore::new());
    let provider = Arc::new(NullIdentityProvider::new());
    let service = KycService::new(
        config,
        Terms::new(TERMS),
        store.clone(),
        provider.clone(),
        Arc::new(NullContractClient::new()),
    );
    TestApp {
        app: router(Arc::new(service)),
        store,
        provider,
    }
}

fn test_app() -> TestApp {
    test_app_with(ServiceConfig {
        webhook_token: WEBHOOK_SECRET.into(),
        ..ServiceConfig::default()
    })
}

fn signer() -> KeyPair {
    keypair_from_seed(&[7; 32]).unwrap()
}

fn user_path(key: &KeyPair) -> String {
    format!("/v1/users/0x{}", to_checksum(&key.address))
}

fn registration_json(key: &KeyPair) -> String {
    let hash = terms_hash(TERMS);
    let sig = sign_digest(hash.as_bytes(), key).unwrap();
    serde_json::json!({
        "email": "ada@example.com",
        "name": "Ada",
        "lastName": "Lovelace",
        "signature": {
            "termsHash": format!("0x{}", hash.to_hex()),
            "r": U256::from_big_endian(&sig.r).to_string(),
            "s": U256::from_big_endian(&sig.s).to_string(),
            "v": (27 + sig.recovery_id as u64).to_string(),
        }
    })
    .to_string()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn register_and_request_check(t: &TestApp, key: &KeyPair) -> CheckId {
    let (status, _) = send(
        &t.app,
        request(Method::POST, &user_path(key), registration_json(key)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&t.app, request(Method::PUT, &user_path(key), Body::empty())).await;
    assert_eq!(status, StatusCode::CREATED);
    t.provider
        .checks_created()
        .last()
        .map(|(_, check_id)| check_id.clone())
        .unwrap()
}

fn webhook_request(check_id: &CheckId, mac: Option<&str>) -> Request<Body> {
    let body = format!(
        r#"{{"payload":{{"resource_type":"check","action":"check.completed","object":{{"id":"{check_id}","status":"complete","completed_at":"2018-01-01 10:00:00 UTC","href":"https://example/checks/{check_id}"}}}}}}"#
    );
    let mac = mac
        .map(str::to_string)
        .unwrap_or_else(|| compute_webhook_mac(body.as_bytes(), WEBHOOK_SECRET.as_bytes()).unwrap());
    Request::builder()
        .method(Method::POST)
        .uri("/v1/webhooks/onfido")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Signature", mac)
        .body(Body::from(body))
        .unwrap()
}

// ── Users ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_created_with_token() {
    let t = test_app();
    let key = signer();
    let (status, body) = send(
        &t.app,
        request(Method::POST, &user_path(&key), registration_json(&key)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token"], "sdk-applicant-1");

    let (status, body) = send(
        &t.app,
        request(Method::POST, &user_path(&key), registration_json(&key)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], "sdk-applicant-1");
}

#[tokio::test]
async fn status_of_fresh_user_is_pending_upload() {
    let t = test_app();
    let key = signer();
    send(
        &t.app,
        request(Method::POST, &user_path(&key), registration_json(&key)),
    )
    .await;

    let (status, body) = send(&t.app, request(Method::GET, &user_path(&key), Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING_DOCUMENT_UPLOAD");
    assert_eq!(body["isVerified"], false);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        request(Method::GET, &user_path(&signer()), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn path_without_hex_prefix_is_not_a_route() {
    let t = test_app();
    let (status, _) = send(
        &t.app,
        request(Method::GET, "/v1/users/not-an-address", Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn flip_first_letter(text: &str) -> String {
    let mut flipped = false;
    text.chars()
        .map(|c| {
            if !flipped && c.is_ascii_alphabetic() {
                flipped = true;
                if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            } else {
                c
            }
        })
        .collect()
}

#[tokio::test]
async fn bad_checksum_reports_address_key() {
    let t = test_app();
    let key = signer();
    let path = format!("/v1/users/0x{}", flip_first_letter(&to_checksum(&key.address)));
    let (status, body) = send(&t.app, request(Method::POST, &path, registration_json(&key))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Key"], "address");
    assert!(t.provider.applicants().is_empty());
}

#[tokio::test]
async fn missing_email_reports_email_key() {
    let t = test_app();
    let key = signer();
    let mut json: Value = serde_json::from_str(&registration_json(&key)).unwrap();
    json["email"] = Value::String(String::new());
    let (status, body) = send(
        &t.app,
        request(Method::POST, &user_path(&key), json.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Key"], "email");
    assert!(t.provider.applicants().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        request(Method::POST, &user_path(&signer()), "{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Key"], "body");
}

#[tokio::test]
async fn signature_from_other_key_is_unauthorized() {
    let t = test_app();
    let owner = signer();
    let impostor = keypair_from_seed(&[8; 32]).unwrap();
    let (status, body) = send(
        &t.app,
        request(Method::POST, &user_path(&owner), registration_json(&impostor)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Message"], "Recovered address mismatch");
    assert_eq!(body["Key"], "address");
}

#[tokio::test]
async fn repeated_check_request_is_no_content() {
    let t = test_app();
    let key = signer();
    register_and_request_check(&t, &key).await;
    let (status, _) = send(&t.app, request(Method::PUT, &user_path(&key), Body::empty())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.provider.checks_created().len(), 1);
}

// ── Webhooks ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn signed_webhook_completes_check() {
    let t = test_app();
    let key = signer();
    let check_id = register_and_request_check(&t, &key).await;
    t.provider.set_result(&check_id, true);

    let (status, _) = send(&t.app, webhook_request(&check_id, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, request(Method::GET, &user_path(&key), Body::empty())).await;
    assert_eq!(body["status"], "ACCEPTED");
    assert_eq!(body["isVerified"], true);
}

#[tokio::test]
async fn forged_webhook_is_unauthorized() {
    let t = test_app();
    let key = signer();
    let check_id = register_and_request_check(&t, &key).await;

    let (status, _) = send(&t.app, webhook_request(&check_id, Some(&"00".repeat(20)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&t.app, request(Method::GET, &user_path(&key), Body::empty())).await;
    assert_eq!(body["status"], "WAITING_FOR_APPROVAL");
}

#[tokio::test]
async fn webhook_for_unknown_check_is_not_found() {
    let t = test_app();
    let (status, _) = send(&t.app, webhook_request(&CheckId::new("nope"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Override ─────────────────────────────────────────────────────────────

fn accept_request(key: &KeyPair, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(format!("{}/accept", user_path(key)));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn override_is_forbidden_when_disabled() {
    let t = test_app();
    let key = signer();
    register_and_request_check(&t, &key).await;
    let (status, body) = send(&t.app, accept_request(&key, Some(OPERATOR_TOKEN))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn override_with_token_accepts_user() {
    let t = test_app_with(ServiceConfig {
        webhook_token: WEBHOOK_SECRET.into(),
        allow_manual_override: true,
        manual_override_token: OPERATOR_TOKEN.into(),
        ..ServiceConfig::default()
    });
    let key = signer();
    register_and_request_check(&t, &key).await;

    let (status, _) = send(&t.app, accept_request(&key, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&t.app, accept_request(&key, Some(OPERATOR_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACCEPTED");

    let (_, body) = send(&t.app, request(Method::GET, &user_path(&key), Body::empty())).await;
    assert_eq!(body["status"], "ACCEPTED");
}

// ── Liveness ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_reports_ok() {
    let t = test_app();
    let (status, _) = send(&t.app, request(Method::GET, "/v1/check", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_check_fails_when_store_is_down() {
    let t = test_app();
    t.store.set_unavailable(true);
    let (status, body) = send(&t.app, request(Method::GET, "/v1/check", Body::empty())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "An internal error occurred");
}
