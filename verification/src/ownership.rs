//! Proof that a caller controls an address.
//!
//! Two paths, chosen by the signature variant:
//! - `Ecdsa`: recover the signer from the terms hash and compare addresses
//! - `Contract`: ask the claimed contract account whether it accepts the
//!   signature over the terms text

use tracing::{debug, warn};

use kyc_crypto::{recover_address, terms_hash};
use kyc_types::{Address, Signature, TermsHash};

use crate::contract::ContractSignatureVerifier;
use crate::error::VerificationError;

/// The terms-of-service text users sign, with its keccak-256 digest.
#[derive(Clone, Debug)]
pub struct Terms {
    text: String,
    hash: TermsHash,
}

impl Terms {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let hash = terms_hash(&text);
        Self { text, hash }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> &TermsHash {
        &self.hash
    }
}

#[derive(Clone)]
pub struct OwnershipVerifier {
    terms: Terms,
    contracts: ContractSignatureVerifier,
}

impl OwnershipVerifier {
    pub fn new(terms: Terms, contracts: ContractSignatureVerifier) -> Self {
        Self { terms, contracts }
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }

    /// Succeeds only if `signature` proves `claimed` agreed to the current terms.
    ///
    /// Has no side effects apart from the contract call on the contract path.
    pub async fn verify(
        &self,
        claimed: &Address,
        terms_hash: &TermsHash,
        signature: &Signature,
    ) -> Result<(), VerificationError> {
        if terms_hash != self.terms.hash() {
            return Err(VerificationError::Validation {
                key: "terms hash".into(),
                message: "does not match the current terms".into(),
            });
        }

        match signature {
            Signature::Ecdsa(sig) => {
                let recovered = recover_address(terms_hash.as_bytes(), sig)?;
                if recovered != *claimed {
                    debug!(claimed = %claimed, recovered = %recovered, "recovered address mismatch");
                    return Err(VerificationError::AddressMismatch(*claimed));
                }
            }
            Signature::Contract(sig) => {
                let accepted = self
                    .contracts
                    .is_valid(claimed, self.terms.text().as_bytes(), &sig.bytes)
                    .await?;
                if !accepted {
                    warn!(contract = %claimed, "contract rejected terms signature");
                    return Err(VerificationError::AddressMismatch(*claimed));
                }
            }
        }
        Ok(())
    }
}
