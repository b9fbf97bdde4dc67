//! Chain access for contract-account ownership proofs.
//!
//! Smart-contract accounts have no private key to recover. Instead the
//! account's own `isValidSignature(bytes,bytes)` decides, queried through a
//! read-only `eth_call`.

pub mod abi;
pub mod client;
pub mod error;

pub use client::{AccountKind, ContractClient, JsonRpcContractClient};
pub use error::ChainError;
