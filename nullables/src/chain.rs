//! Nullable chain: scripted `isValidSignature` answers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use kyc_chain::{ChainError, ContractClient};
use kyc_types::Address;

/// One recorded `isValidSignature` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub message: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A contract client whose contracts answer from a table.
///
/// Contracts not in the table reject every signature.
#[derive(Default)]
pub struct NullContractClient {
    verdicts: Mutex<HashMap<Address, bool>>,
    calls: Mutex<Vec<ContractCall>>,
    unreachable: AtomicBool,
}

impl NullContractClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `contract` accept every signature.
    pub fn approve(&self, contract: Address) {
        self.verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(contract, true);
    }

    /// Simulate an RPC outage.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// All calls made so far (for assertions).
    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContractClient for NullContractClient {
    async fn call_is_valid_signature(
        &self,
        contract: &Address,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ChainError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ContractCall {
                contract: *contract,
                message: message.to_vec(),
                signature: signature.to_vec(),
            });
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ChainError::Unreachable("null chain is unreachable".into()));
        }
        Ok(self
            .verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(contract)
            .copied()
            .unwrap_or(false))
    }
}
