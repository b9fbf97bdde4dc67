//! LMDB record storage backend for the KYC gate.
//!
//! Implements the storage traits from `kyc-store` using the `heed` LMDB bindings.
//! Users, checks and the user -> check index each map to one LMDB database
//! within a single environment.

pub mod environment;
pub mod error;
pub mod records;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use records::LmdbRecordStore;
