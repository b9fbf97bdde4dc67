//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ServiceError;

/// Configuration for the KYC service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Base URL of the identity-verification vendor API.
    #[serde(default = "default_provider_api_url")]
    pub provider_api_url: String,

    /// Vendor API token.
    #[serde(default)]
    pub provider_api_token: String,

    /// Timeout for a single vendor request, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Referrer pattern bound into SDK tokens.
    #[serde(default = "default_sdk_token_referrer")]
    pub sdk_token_referrer: String,

    /// Shared secret for webhook HMACs.
    #[serde(default)]
    pub webhook_token: String,

    /// JSON-RPC endpoint of the chain hosting contract accounts.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Require checksum casing on addresses in request paths.
    #[serde(default = "default_true")]
    pub checksummed_addresses: bool,

    /// Enable the operator override endpoint.
    #[serde(default)]
    pub allow_manual_override: bool,

    /// Bearer token the operator must present to override.
    #[serde(default)]
    pub manual_override_token: String,

    /// Terms-of-service text users sign.
    #[serde(default = "default_terms_file")]
    pub terms_file: PathBuf,

    /// Data directory for record storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_port() -> u16 {
    8080
}

fn default_provider_api_url() -> String {
    "https://api.onfido.com/v2".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_sdk_token_referrer() -> String {
    "*://*/*".to_string()
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_true() -> bool {
    true
}

fn default_terms_file() -> PathBuf {
    PathBuf::from("./terms.txt")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./kyc_data")
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ServiceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.webhook_token.is_empty() {
            return Err(ServiceError::Config(
                "webhook_token must be set; webhooks cannot be authenticated without it".into(),
            ));
        }
        if self.allow_manual_override && self.manual_override_token.is_empty() {
            return Err(ServiceError::Config(
                "allow_manual_override requires manual_override_token".into(),
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(ServiceError::Config(
                "provider_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            provider_api_url: default_provider_api_url(),
            provider_api_token: String::new(),
            provider_timeout_secs: default_provider_timeout_secs(),
            sdk_token_referrer: default_sdk_token_referrer(),
            webhook_token: String::new(),
            rpc_url: default_rpc_url(),
            checksummed_addresses: default_true(),
            allow_manual_override: false,
            manual_override_token: String::new(),
            terms_file: default_terms_file(),
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
