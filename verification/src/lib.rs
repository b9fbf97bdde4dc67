//! KYC gate core: ownership proofs and the check lifecycle.
//!
//! - [`OwnershipVerifier`] decides whether a signature proves control of an
//!   address, by ECDSA recovery or by delegating to a contract account
//! - [`CheckStateMachine`] creates, completes and overrides verification checks
//! - [`derive_status`] maps a user's optional check to its status
//!
//! Storage and chain access are injected; nothing here holds global state.

pub mod checks;
pub mod contract;
pub mod error;
pub mod ownership;

pub use checks::CheckStateMachine;
pub use contract::ContractSignatureVerifier;
pub use error::VerificationError;
pub use ownership::{OwnershipVerifier, Terms};

use kyc_types::{Check, VerificationStatus};

/// Status of a user given their check, if any.
pub fn derive_status(check: Option<&Check>) -> VerificationStatus {
    VerificationStatus::derive(check)
}
