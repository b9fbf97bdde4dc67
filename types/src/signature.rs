//! Ownership-proof signatures.
//!
//! The wire protocol carries `{termsHash, r, s, v}` with `r`/`s` as decimal
//! 256-bit integers. The value of `v` decides the verification path:
//! `27`/`28` are key-pair (ECDSA) signatures, `1` marks a smart-contract
//! account whose own `isValidSignature` logic is authoritative. That decision
//! is made once, here, and carried as a closed enum from then on.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::KycError;
use crate::hash::TermsHash;

/// `v` value marking a contract-delegated signature.
pub const CONTRACT_V: u64 = 1;

/// Offset between Ethereum's `v` (27/28) and the 0/1 recovery id.
pub const ECDSA_V_OFFSET: u64 = 27;

/// A secp256k1 signature with its recovery id normalized to `0` or `1`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl EcdsaSignature {
    /// `r (32, big-endian) || s (32, big-endian) || recovery_id (1)`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.recovery_id;
        out
    }
}

impl std::fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EcdsaSignature(r={}.., recovery_id={})",
            hex::encode(&self.r[..4]),
            self.recovery_id
        )
    }
}

/// Signature bytes forwarded verbatim to a contract account for validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSignature {
    pub bytes: Vec<u8>,
}

/// An ownership proof, tagged by verification path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    Ecdsa(EcdsaSignature),
    Contract(ContractSignature),
}

impl Signature {
    /// Build a signature from the wire fields `r`, `s`, `v` (decimal strings).
    pub fn from_wire(r: &str, s: &str, v: &str) -> Result<Self, KycError> {
        let r = parse_u256_be("r", r)?;
        let s = parse_u256_be("s", s)?;
        let v = parse_small("v", v)?;

        match v {
            27 | 28 => Ok(Self::Ecdsa(EcdsaSignature {
                r,
                s,
                recovery_id: (v - ECDSA_V_OFFSET) as u8,
            })),
            CONTRACT_V => {
                let mut bytes = Vec::with_capacity(65);
                bytes.extend_from_slice(&r);
                bytes.extend_from_slice(&s);
                bytes.push(CONTRACT_V as u8);
                Ok(Self::Contract(ContractSignature { bytes }))
            }
            other => Err(KycError::validation(
                "v",
                format!("unsupported value {other}, expected 1, 27 or 28"),
            )),
        }
    }

    /// Hex rendering persisted on the user record.
    ///
    /// ECDSA: `r(64) || s(64) || recovery_id(2)`; contract: the forwarded bytes.
    pub fn composed_hex(&self) -> String {
        match self {
            Self::Ecdsa(sig) => hex::encode(sig.to_bytes()),
            Self::Contract(sig) => hex::encode(&sig.bytes),
        }
    }

    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}

/// Signed-terms payload as it arrives from clients.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSignature {
    #[serde(default)]
    pub terms_hash: String,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub v: String,
}

impl WireSignature {
    /// Parse into a terms hash and a tagged signature.
    pub fn parse(&self) -> Result<(TermsHash, Signature), KycError> {
        if self.terms_hash.is_empty() {
            return Err(KycError::validation("terms hash", "is required"));
        }
        let terms_hash = TermsHash::from_hex(&self.terms_hash)?;
        let signature = Signature::from_wire(&self.r, &self.s, &self.v)?;
        Ok((terms_hash, signature))
    }
}

fn require_digits(key: &str, text: &str) -> Result<(), KycError> {
    if text.is_empty() {
        return Err(KycError::validation(key, "is required"));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KycError::validation(key, "must be a decimal number"));
    }
    Ok(())
}

fn parse_u256_be(key: &str, text: &str) -> Result<[u8; 32], KycError> {
    require_digits(key, text)?;
    let value = U256::from_dec_str(text)
        .map_err(|_| KycError::validation(key, "does not fit in 256 bits"))?;
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    Ok(out)
}

fn parse_small(key: &str, text: &str) -> Result<u64, KycError> {
    require_digits(key, text)?;
    text.parse::<u64>()
        .map_err(|_| KycError::validation(key, "out of range"))
}
