//! Account address type (20 bytes, hex-encoded at the boundary).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KycError;

/// A 20-byte account address.
///
/// The canonical textual form is 40 lowercase hex characters without a
/// `0x` prefix; this is the form used as a storage key. Mixed-case checksum
/// forms are validated once at the boundary and then discarded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// Length of the hex form without prefix.
    pub const HEX_LEN: usize = 40;

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse an address from hex, with or without a `0x` prefix.
    ///
    /// Casing is ignored here; checksum validation is a separate step.
    pub fn parse(text: &str) -> Result<Self, KycError> {
        let digits = strip_hex_prefix(text);
        if digits.len() != Self::HEX_LEN {
            return Err(KycError::InvalidAddress(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                digits.len()
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| KycError::InvalidAddress(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form without prefix (the storage key).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex form with a `0x` prefix.
    pub fn to_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = KycError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_prefix_and_mixed_case() {
        let a = Address::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let b = Address::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse(&"a".repeat(41)).is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(Address::parse(&"g".repeat(40)).is_err());
    }

    #[test]
    fn prefixed_form() {
        let a = Address::from_bytes([0xab; 20]);
        assert_eq!(a.to_prefixed(), format!("0x{}", "ab".repeat(20)));
    }
}
