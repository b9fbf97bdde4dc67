//! secp256k1 key pairs and Ethereum-style address derivation.
//!
//! The service itself never holds keys; these helpers exist so wallets,
//! tooling and tests can produce the signatures the service verifies.

use k256::ecdsa::{SigningKey, VerifyingKey};
use kyc_types::{Address, EcdsaSignature};

use crate::error::CryptoError;
use crate::hash::keccak256;

/// A secp256k1 signing key together with its derived address.
pub struct KeyPair {
    signing_key: SigningKey,
    pub address: Address,
}

impl KeyPair {
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }
}

/// Derive the address of a public key: the low 20 bytes of
/// `keccak256(uncompressed_point[1..])` (the SEC1 format byte is dropped).
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}

/// Build a key pair from a 32-byte secret scalar.
///
/// Fails if the scalar is zero or not below the curve order.
pub fn keypair_from_seed(seed: &[u8; 32]) -> Result<KeyPair, CryptoError> {
    let signing_key =
        SigningKey::from_slice(seed).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let address = address_from_verifying_key(signing_key.verifying_key());
    Ok(KeyPair {
        signing_key,
        address,
    })
}

/// Generate a key pair from the operating system's entropy source.
pub fn generate_keypair() -> Result<KeyPair, CryptoError> {
    loop {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|e| CryptoError::Entropy(e.to_string()))?;
        // Out-of-range scalars are astronomically rare; draw again.
        if let Ok(pair) = keypair_from_seed(&seed) {
            return Ok(pair);
        }
    }
}

/// Sign a 32-byte digest, producing a low-s signature with its recovery id.
pub fn sign_digest(digest: &[u8; 32], keypair: &KeyPair) -> Result<EcdsaSignature, CryptoError> {
    let (signature, recovery_id) = keypair
        .signing_key
        .sign_prehash_recoverable(digest)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(EcdsaSignature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}
