//! Abstract record storage traits for the KYC gate.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod check;
pub mod error;
pub mod user;

pub use check::{CheckStore, RecordStore, Swapped};
pub use error::StoreError;
pub use user::{Inserted, UserStore};
