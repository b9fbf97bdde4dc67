//! Persisted records: users bound to an address and their verification check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::hash::TermsHash;

/// Opaque applicant id issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(String);

/// Opaque check id issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

opaque_id!(ApplicantId);
opaque_id!(CheckId);

/// A user who proved control of `address` by signing the terms.
///
/// Created once per address and immutable afterwards; the optional check
/// link lives in the check store (see [`Check::user`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub address: Address,
    pub applicant_id: ApplicantId,
    pub terms_hash: TermsHash,
    /// Hex-encoded signature over `terms_hash`.
    pub terms_signature: String,
}

/// One verification run against a user's applicant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub check_id: CheckId,
    /// Owning user.
    pub user: Address,
    pub is_verified: bool,
    pub is_clear: bool,
}

impl Check {
    /// A freshly requested check, awaiting the provider's verdict.
    pub fn pending(check_id: CheckId, user: Address) -> Self {
        Self {
            check_id,
            user,
            is_verified: false,
            is_clear: false,
        }
    }
}
