//! Minimal ABI codec for `isValidSignature(bytes,bytes) returns (bool)`.

use kyc_crypto::keccak256;

use crate::error::ChainError;

/// Canonical signature of the contract function.
pub const IS_VALID_SIGNATURE: &str = "isValidSignature(bytes,bytes)";

const WORD: usize = 32;

/// First four bytes of the keccak-256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn word_from_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Append `len || data || zero padding` for a dynamic `bytes` value.
fn push_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&word_from_usize(data.len()));
    out.extend_from_slice(data);
    out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
}

/// Calldata for `isValidSignature(message, signature)`.
pub fn encode_is_valid_signature(message: &[u8], signature: &[u8]) -> Vec<u8> {
    let head_len = 2 * WORD;
    let first_offset = head_len;
    let second_offset = first_offset + WORD + padded_len(message.len());

    let mut out = Vec::with_capacity(
        4 + head_len + 2 * WORD + padded_len(message.len()) + padded_len(signature.len()),
    );
    out.extend_from_slice(&selector(IS_VALID_SIGNATURE));
    out.extend_from_slice(&word_from_usize(first_offset));
    out.extend_from_slice(&word_from_usize(second_offset));
    push_bytes(&mut out, message);
    push_bytes(&mut out, signature);
    out
}

/// Decode a single ABI-encoded `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool, ChainError> {
    if data.len() < WORD {
        return Err(ChainError::InvalidResponse(format!(
            "expected a 32-byte bool, got {} bytes",
            data.len()
        )));
    }
    let word = &data[..WORD];
    if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
        return Err(ChainError::InvalidResponse(
            "return value is not a bool".into(),
        ));
    }
    Ok(word[WORD - 1] == 1)
}
