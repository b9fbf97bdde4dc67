//! Delegated signature validation for smart-contract accounts.

use std::sync::Arc;

use kyc_chain::ContractClient;
use kyc_types::Address;

use crate::error::VerificationError;

/// Typed adapter over a [`ContractClient`].
///
/// A contract answering `false` is `Ok(false)`; RPC trouble is `RpcFailure`.
#[derive(Clone)]
pub struct ContractSignatureVerifier {
    client: Arc<dyn ContractClient>,
}

impl ContractSignatureVerifier {
    pub fn new(client: Arc<dyn ContractClient>) -> Self {
        Self { client }
    }

    pub async fn is_valid(
        &self,
        contract: &Address,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, VerificationError> {
        Ok(self
            .client
            .call_is_valid_signature(contract, message, signature)
            .await?)
    }
}
