//! Fundamental types for the KYC gate.
//!
//! Shared by every other crate in the workspace: account addresses, terms
//! digests, tagged ownership signatures, user/check records and the derived
//! verification status.

pub mod address;
pub mod error;
pub mod hash;
pub mod record;
pub mod signature;
pub mod state;

pub use address::Address;
pub use error::KycError;
pub use hash::TermsHash;
pub use record::{ApplicantId, Check, CheckId, User};
pub use signature::{ContractSignature, EcdsaSignature, Signature, WireSignature};
pub use state::VerificationStatus;
