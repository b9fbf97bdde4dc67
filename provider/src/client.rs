//! HTTP client for the identity-verification vendor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use kyc_types::{ApplicantId, CheckId};

use crate::error::ProviderError;
use crate::types::{
    ApplicantResponse, CheckResponse, NewApplicant, SdkTokenRequest, SdkTokenResponse,
    CHECK_REPORTS,
};

/// Default timeout for vendor requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The operations the gate needs from the identity-verification vendor.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<ApplicantId, ProviderError>;

    /// Start a standard check with identity, document and facial-similarity reports.
    async fn create_check(&self, applicant_id: &ApplicantId) -> Result<CheckId, ProviderError>;

    /// Whether a completed check came back clear.
    async fn get_check_result(
        &self,
        applicant_id: &ApplicantId,
        check_id: &CheckId,
    ) -> Result<bool, ProviderError>;

    /// Short-lived token letting the front end upload documents for `applicant_id`.
    async fn sdk_token(
        &self,
        applicant_id: &ApplicantId,
        referrer: &str,
    ) -> Result<String, ProviderError>;
}

/// Vendor REST API client (`Authorization: Token token=...`).
pub struct OnfidoClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl OnfidoClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorization(&self) -> String {
        format!("Token token={}", self.api_token)
    }

    async fn read<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
        expected: StatusCode,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        debug!(operation, %status, "provider responded");
        if status != expected {
            return Err(ProviderError::Rejected {
                operation,
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse {operation} response: {e}"))
        })
    }
}

#[async_trait]
impl IdentityProvider for OnfidoClient {
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<ApplicantId, ProviderError> {
        let response = self
            .http_client
            .post(self.url("applicants/"))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(applicant)
            .send()
            .await?;
        let created: ApplicantResponse =
            Self::read(response, "create applicant", StatusCode::CREATED).await?;
        info!(applicant_id = %created.id, "applicant created");
        Ok(ApplicantId::new(created.id))
    }

    async fn create_check(&self, applicant_id: &ApplicantId) -> Result<CheckId, ProviderError> {
        let mut form: Vec<(&str, &str)> = vec![("type", "standard")];
        form.extend(CHECK_REPORTS.iter().map(|name| ("reports[][name]", *name)));

        let response = self
            .http_client
            .post(self.url(&format!("applicants/{applicant_id}/checks/")))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .form(&form)
            .send()
            .await?;
        let created: CheckResponse =
            Self::read(response, "create check", StatusCode::CREATED).await?;
        info!(%applicant_id, check_id = %created.id, "check created");
        Ok(CheckId::new(created.id))
    }

    async fn get_check_result(
        &self,
        applicant_id: &ApplicantId,
        check_id: &CheckId,
    ) -> Result<bool, ProviderError> {
        let response = self
            .http_client
            .get(self.url(&format!("applicants/{applicant_id}/checks/{check_id}")))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;
        let check: CheckResponse = Self::read(response, "get check", StatusCode::OK).await?;
        debug!(%check_id, result = ?check.result, "check fetched");
        Ok(check.is_clear())
    }

    async fn sdk_token(
        &self,
        applicant_id: &ApplicantId,
        referrer: &str,
    ) -> Result<String, ProviderError> {
        let body = SdkTokenRequest {
            applicant_id: applicant_id.as_str(),
            referrer,
        };
        let response = self
            .http_client
            .post(self.url("sdk_token/"))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await?;
        let token: SdkTokenResponse = Self::read(response, "sdk token", StatusCode::OK).await?;
        Ok(token.token)
    }
}
