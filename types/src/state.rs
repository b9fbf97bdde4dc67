//! Derived verification status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Check;

/// Where a user stands in the verification lifecycle.
///
/// Never stored: always derived from the check record via [`VerificationStatus::derive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// No check has been requested yet.
    PendingDocumentUpload,
    /// A check exists and the provider has not reported.
    WaitingForApproval,
    /// Terminal: the provider reported a clear result.
    Accepted,
    /// Terminal: the provider reported a non-clear result.
    Denied,
}

impl VerificationStatus {
    pub fn derive(check: Option<&Check>) -> Self {
        match check {
            None => Self::PendingDocumentUpload,
            Some(c) if !c.is_verified => Self::WaitingForApproval,
            Some(c) if c.is_clear => Self::Accepted,
            Some(_) => Self::Denied,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Denied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingDocumentUpload => "PENDING_DOCUMENT_UPLOAD",
            Self::WaitingForApproval => "WAITING_FOR_APPROVAL",
            Self::Accepted => "ACCEPTED",
            Self::Denied => "DENIED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
