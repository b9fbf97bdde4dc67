//! Mixed-case address checksums (EIP-55).
//!
//! The letter casing of a 40-character hex address encodes a checksum:
//! hash the lowercase text with keccak-256, then for each position `i`
//! the letter must be uppercase if hash nibble `i` is greater than 7 and
//! lowercase otherwise. Digits carry no case and always pass.

use kyc_types::{address::strip_hex_prefix, Address, KycError};

use crate::hash::keccak256;

/// Nibble `i` (0..64) of a 32-byte digest, most significant first.
fn nibble(hash: &[u8; 32], i: usize) -> u8 {
    let byte = hash[i / 2];
    if i % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0f
    }
}

/// Validate the checksum casing of a 40-character hex address (no `0x` prefix).
///
/// Any input that is not exactly 40 hex characters is rejected.
pub fn validate_checksum(address_text: &str) -> bool {
    if address_text.len() != Address::HEX_LEN
        || !address_text.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return false;
    }

    let hash = keccak256(address_text.to_ascii_lowercase().as_bytes());

    address_text.bytes().enumerate().all(|(i, c)| {
        if c.is_ascii_digit() {
            return true;
        }
        if nibble(&hash, i) > 7 {
            c.is_ascii_uppercase()
        } else {
            c.is_ascii_lowercase()
        }
    })
}

/// Render an address in checksum casing (no `0x` prefix).
pub fn to_checksum(address: &Address) -> String {
    let lower = address.to_hex();
    let hash = keccak256(lower.as_bytes());
    lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_ascii_alphabetic() && nibble(&hash, i) > 7 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Parse an address, requiring valid checksum casing. Accepts an optional `0x`.
pub fn parse_checksummed(text: &str) -> Result<Address, KycError> {
    let address = Address::parse(text)?;
    if !validate_checksum(strip_hex_prefix(text)) {
        return Err(KycError::InvalidChecksum);
    }
    Ok(address)
}
