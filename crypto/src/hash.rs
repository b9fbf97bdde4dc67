//! Keccak-256 hashing.

use kyc_types::TermsHash;
use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 digest of arbitrary data.
///
/// This is the pre-standard Keccak padding used by Ethereum, not NIST SHA3-256.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Digest of the terms-of-service text a user signs.
pub fn terms_hash(terms_text: &str) -> TermsHash {
    TermsHash::new(keccak256(terms_text.as_bytes()))
}
