//! JSON-RPC client for contract-account signature checks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use kyc_types::Address;

use crate::abi::{decode_bool, encode_is_valid_signature};
use crate::error::ChainError;

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only access to the target chain.
///
/// A contract answering `false` is `Ok(false)`; only transport and protocol
/// failures are errors.
#[async_trait]
pub trait ContractClient: Send + Sync {
    async fn call_is_valid_signature(
        &self,
        contract: &Address,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ChainError>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// `eth_call`/`eth_getCode` over HTTP JSON-RPC.
pub struct JsonRpcContractClient {
    http_client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcContractClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ChainError::Unreachable(format!("connection failed: {e}"))
                } else {
                    ChainError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ChainError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let parsed: RpcResponse = response.json().await.map_err(|e| {
            ChainError::InvalidResponse(format!("failed to parse {method} response: {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| ChainError::InvalidResponse(format!("{method}: missing result")))
    }

    /// Deployed bytecode at `address` at the latest block.
    pub async fn get_code(&self, address: &Address) -> Result<Vec<u8>, ChainError> {
        let result = self
            .request("eth_getCode", json!([address.to_prefixed(), "latest"]))
            .await?;
        decode_hex_result(&result)
    }

    /// Whether `address` holds contract code or is a key-pair account.
    pub async fn account_kind(&self, address: &Address) -> Result<AccountKind, ChainError> {
        if self.get_code(address).await?.is_empty() {
            Ok(AccountKind::KeyPair)
        } else {
            Ok(AccountKind::Contract)
        }
    }
}

/// How an account proves ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    /// Externally owned: ECDSA signature with `v` 27 or 28.
    KeyPair,
    /// Contract account: `v = 1`, validated by `isValidSignature`.
    Contract,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyPair => f.write_str("key-pair account (sign with v = 27/28)"),
            Self::Contract => f.write_str("contract account (sign with v = 1)"),
        }
    }
}

#[async_trait]
impl ContractClient for JsonRpcContractClient {
    async fn call_is_valid_signature(
        &self,
        contract: &Address,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ChainError> {
        let data = encode_is_valid_signature(message, signature);
        let call = json!({
            "to": contract.to_prefixed(),
            "data": format!("0x{}", hex::encode(&data)),
        });
        let result = self.request("eth_call", json!([call, "latest"])).await?;
        let bytes = decode_hex_result(&result)?;
        debug!(contract = %contract, result_len = bytes.len(), "isValidSignature returned");

        // Calls to accounts without code succeed with empty output.
        if bytes.is_empty() {
            return Ok(false);
        }
        decode_bool(&bytes)
    }
}

fn decode_hex_result(value: &Value) -> Result<Vec<u8>, ChainError> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse("result is not a string".into()))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("result {text:?} lacks 0x prefix")))?;
    hex::decode(digits).map_err(|e| ChainError::InvalidResponse(format!("bad hex result: {e}")))
}
