//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the gate (record store, chain RPC,
//! identity-verification vendor) sits behind a trait. This crate provides
//! in-memory implementations that:
//! - Return deterministic values
//! - Can be steered and inspected programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod provider;
pub mod store;

pub use chain::NullContractClient;
pub use provider::NullIdentityProvider;
pub use store::NullStore;
