//! The KYC gate's operations, composed from the core and its collaborators.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use kyc_chain::ContractClient;
use kyc_crypto::{authenticate_webhook, parse_checksummed};
use kyc_provider::{IdentityProvider, NewApplicant, WebhookEvent};
use kyc_store::{CheckStore, Inserted, RecordStore, UserStore};
use kyc_types::{Address, Check, CheckId, User, VerificationStatus, WireSignature};
use kyc_verification::{
    derive_status, CheckStateMachine, ContractSignatureVerifier, OwnershipVerifier, Terms,
};

use crate::config::ServiceConfig;
use crate::validation;
use crate::ServiceError;

/// Registration request: personal details plus the signed terms.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub signature: WireSignature,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registered {
    /// Whether this call created the user.
    pub created: bool,
    pub sdk_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub status: VerificationStatus,
    pub is_verified: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckRequested {
    pub created: bool,
    pub check: Check,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Completed(Check),
    Ignored { resource_type: String, action: String },
}

/// Orchestrates registration, check requests, webhooks and overrides.
///
/// Holds no mutable state of its own; all state lives in the record store.
pub struct KycService {
    config: ServiceConfig,
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn IdentityProvider>,
    ownership: OwnershipVerifier,
}

impl KycService {
    pub fn new(
        config: ServiceConfig,
        terms: Terms,
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn IdentityProvider>,
        contracts: Arc<dyn ContractClient>,
    ) -> Self {
        let ownership = OwnershipVerifier::new(terms, ContractSignatureVerifier::new(contracts));
        Self {
            config,
            store,
            provider,
            ownership,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn terms(&self) -> &Terms {
        self.ownership.terms()
    }

    /// Parse a path address, enforcing checksum casing when configured.
    pub fn parse_address(&self, text: &str) -> Result<Address, ServiceError> {
        let address = if self.config.checksummed_addresses {
            parse_checksummed(text)?
        } else {
            Address::parse(text)?
        };
        Ok(address)
    }

    /// Prove ownership of `address_text` and open (or reuse) an applicant.
    pub async fn register(
        &self,
        address_text: &str,
        registration: &Registration,
    ) -> Result<Registered, ServiceError> {
        let address = self.parse_address(address_text)?;

        validation::email("email", &registration.email)?;
        validation::required("name", &registration.name)?;
        validation::required("last name", &registration.last_name)?;
        let (terms_hash, signature) = registration.signature.parse()?;

        self.ownership
            .verify(&address, &terms_hash, &signature)
            .await?;
        debug!(address = %address, contract = signature.is_contract(), "ownership proven");

        let (user, created) = match self.store.get_user(&address) {
            Ok(user) => (user, false),
            Err(e) if e.is_not_found() => {
                let applicant_id = self
                    .provider
                    .create_applicant(&NewApplicant {
                        first_name: registration.name.clone(),
                        last_name: registration.last_name.clone(),
                        email: registration.email.clone(),
                    })
                    .await?;
                let candidate = User {
                    address,
                    applicant_id,
                    terms_hash,
                    terms_signature: signature.composed_hex(),
                };
                match self.store.insert_user_if_absent(&candidate)? {
                    Inserted::Created(user) => {
                        info!(address = %address, applicant_id = %user.applicant_id, "user registered");
                        (user, true)
                    }
                    Inserted::Existing(user) => {
                        warn!(
                            address = %address,
                            orphaned_applicant = %candidate.applicant_id,
                            "concurrent registration, keeping existing user"
                        );
                        (user, false)
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        let sdk_token = self
            .provider
            .sdk_token(&user.applicant_id, &self.config.sdk_token_referrer)
            .await?;
        Ok(Registered { created, sdk_token })
    }

    pub async fn status(&self, address_text: &str) -> Result<UserStatus, ServiceError> {
        let address = self.parse_address(address_text)?;
        let user = self.store.get_user(&address)?;
        let status = derive_status(self.store.check_for_user(&user.address)?.as_ref());
        Ok(UserStatus {
            status,
            is_verified: status == VerificationStatus::Accepted,
        })
    }

    /// Start the vendor check for a registered user, once.
    pub async fn request_check(&self, address_text: &str) -> Result<CheckRequested, ServiceError> {
        let address = self.parse_address(address_text)?;
        let user = self.store.get_user(&address)?;

        if let Some(check) = self.store.check_for_user(&address)? {
            debug!(address = %address, check_id = %check.check_id, "check already requested");
            return Ok(CheckRequested {
                created: false,
                check,
            });
        }

        let check_id = self.provider.create_check(&user.applicant_id).await?;
        let inserted = CheckStateMachine.create(&*self.store, &user, check_id)?;
        Ok(CheckRequested {
            created: inserted.was_created(),
            check: inserted.into_inner(),
        })
    }

    /// Authenticate and apply a vendor webhook. `raw_body` must be the bytes as received.
    pub async fn handle_webhook(
        &self,
        raw_body: &[u8],
        mac_header: Option<&str>,
    ) -> Result<WebhookOutcome, ServiceError> {
        let Some(mac) = mac_header else {
            warn!("webhook without signature header");
            return Err(ServiceError::Unauthorized);
        };
        if !authenticate_webhook(raw_body, mac, self.config.webhook_token.as_bytes()) {
            warn!(body_len = raw_body.len(), "webhook signature mismatch");
            return Err(ServiceError::Unauthorized);
        }

        let event: WebhookEvent = serde_json::from_slice(raw_body)
            .map_err(|e| ServiceError::validation("payload", e.to_string()))?;
        let payload = event.payload;
        if !payload.is_check_completed() {
            debug!(resource_type = %payload.resource_type, action = %payload.action, "webhook ignored");
            return Ok(WebhookOutcome::Ignored {
                resource_type: payload.resource_type,
                action: payload.action,
            });
        }

        let check_id = CheckId::new(payload.object.id);
        let check = self.store.get_check(&check_id)?;
        let user = self.store.get_user(&check.user)?;
        let clear = self
            .provider
            .get_check_result(&user.applicant_id, &check_id)
            .await?;

        let completed = CheckStateMachine.complete(&*self.store, &check_id, clear)?;
        Ok(WebhookOutcome::Completed(completed))
    }

    /// Operator escape hatch: mark a registered user ACCEPTED.
    pub async fn force_accept(
        &self,
        address_text: &str,
        operator_token: Option<&str>,
    ) -> Result<Check, ServiceError> {
        if !self.config.allow_manual_override || !self.operator_token_matches(operator_token) {
            warn!("manual override refused");
            return Err(ServiceError::Forbidden);
        }
        let address = self.parse_address(address_text)?;
        let user = self.store.get_user(&address)?;
        let check = CheckStateMachine.force_accept(&*self.store, &user.address)?;
        info!(address = %address, check_id = %check.check_id, "manual override applied");
        Ok(check)
    }

    fn operator_token_matches(&self, supplied: Option<&str>) -> bool {
        let expected = self.config.manual_override_token.as_bytes();
        match supplied {
            Some(token) if !expected.is_empty() => token.as_bytes().ct_eq(expected).into(),
            _ => false,
        }
    }

    /// Liveness probe: a cheap read against the record store.
    pub fn health(&self) -> Result<u64, ServiceError> {
        Ok(self.store.user_count()?)
    }
}
