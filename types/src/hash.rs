//! Terms-of-service digest type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::strip_hex_prefix;
use crate::error::KycError;

/// 32-byte keccak-256 digest of the terms-of-service text a user agreed to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermsHash([u8; 32]);

impl TermsHash {
    pub const HEX_LEN: usize = 64;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse 64 hex characters, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, KycError> {
        let digits = strip_hex_prefix(text);
        if digits.len() != Self::HEX_LEN {
            return Err(KycError::validation(
                "terms hash",
                format!("must be {} hex characters", Self::HEX_LEN),
            ));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| KycError::validation("terms hash", e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for TermsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermsHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TermsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_strips_prefix() {
        let hex = "ab".repeat(32);
        let with = TermsHash::from_hex(&format!("0x{hex}")).unwrap();
        let without = TermsHash::from_hex(&hex).unwrap();
        assert_eq!(with, without);
        assert_eq!(with.to_hex(), hex);
    }

    #[test]
    fn from_hex_rejects_short_input() {
        let err = TermsHash::from_hex("abcd").unwrap_err();
        assert_eq!(err.field_key(), Some("terms hash"));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(TermsHash::from_hex(&"zz".repeat(32)).is_err());
    }
}
