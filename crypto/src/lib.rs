//! Cryptographic primitives for the KYC gate.
//!
//! - **Keccak-256** for terms digests and address derivation
//! - **EIP-55** mixed-case address checksums
//! - **secp256k1** public-key recovery for ownership proofs
//! - **HMAC-SHA1** authentication of provider webhooks

pub mod checksum;
pub mod error;
pub mod hash;
pub mod keys;
pub mod recover;
pub mod webhook;

pub use checksum::{parse_checksummed, to_checksum, validate_checksum};
pub use error::CryptoError;
pub use hash::{keccak256, terms_hash};
pub use keys::{address_from_verifying_key, generate_keypair, keypair_from_seed, sign_digest, KeyPair};
pub use recover::recover_address;
pub use webhook::{authenticate_webhook, compute_webhook_mac};
