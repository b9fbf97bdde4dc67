//! secp256k1 public-key recovery (ECDSA ownership proofs).

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use kyc_types::{Address, EcdsaSignature};

use crate::error::CryptoError;
use crate::keys::address_from_verifying_key;

/// Recover the signer's address from a signature over a 32-byte digest.
///
/// The 65-byte `r || s || recovery_id` form is split into its scalars and
/// recovered with standard secp256k1 recovery. High-s signatures are
/// accepted by negating `s` and flipping the y-parity of the recovery id,
/// which recovers the same key.
///
/// Any failure (zero or out-of-range scalars, `r` not an x-coordinate on
/// the curve, recovery id outside `{0, 1}`) is [`CryptoError::RecoveryFailed`]:
/// callers should treat it as "signature invalid".
pub fn recover_address(digest: &[u8; 32], signature: &EcdsaSignature) -> Result<Address, CryptoError> {
    if signature.recovery_id > 1 {
        return Err(CryptoError::RecoveryFailed(format!(
            "recovery id {} out of range",
            signature.recovery_id
        )));
    }
    let bytes = signature.to_bytes();
    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id)
        .ok_or_else(|| CryptoError::RecoveryFailed("invalid recovery id".into()))?;

    let (sig, recovery_id) = match sig.normalize_s() {
        Some(low) => (
            low,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    };

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(address_from_verifying_key(&key))
}
