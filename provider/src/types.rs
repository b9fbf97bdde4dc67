//! Request and response shapes of the identity-verification vendor API.
//!
//! Only the fields the gate reads or writes are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

/// Personal details submitted when opening an applicant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplicant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApplicantResponse {
    pub id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SdkTokenRequest<'a> {
    pub applicant_id: &'a str,
    pub referrer: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SdkTokenResponse {
    pub token: String,
}

/// A check as returned by the vendor.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

impl CheckResponse {
    /// `"clear"` is the only passing result; `"consider"` and anything else fail.
    pub fn is_clear(&self) -> bool {
        self.result.as_deref() == Some(CHECK_RESULT_CLEAR)
    }
}

pub const CHECK_RESULT_CLEAR: &str = "clear";

/// Reports requested for every check.
pub const CHECK_REPORTS: [&str; 3] = ["identity", "document", "facial_similarity"];

/// Webhook envelope.
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookEvent {
    pub payload: WebhookPayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub resource_type: String,
    pub object: WebhookObject,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

pub const RESOURCE_CHECK: &str = "check";
pub const ACTION_CHECK_COMPLETED: &str = "check.completed";

impl WebhookPayload {
    /// The only event that moves a check forward.
    pub fn is_check_completed(&self) -> bool {
        self.resource_type == RESOURCE_CHECK && self.action == ACTION_CHECK_COMPLETED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_event_parses_vendor_shape() {
        let raw = r#"{
            "payload": {
                "resource_type": "check",
                "action": "check.completed",
                "object": {
                    "id": "chk-1",
                    "status": "complete",
                    "completed_at": "2018-01-01 10:00:00 UTC",
                    "href": "https://api.onfido.com/v2/applicants/a/checks/chk-1"
                }
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert!(event.payload.is_check_completed());
        assert_eq!(event.payload.object.id, "chk-1");
    }

    #[test]
    fn other_events_are_not_completions() {
        let raw = r#"{"payload":{"resource_type":"report","action":"report.completed","object":{"id":"r"}}}"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert!(!event.payload.is_check_completed());
    }

    #[test]
    fn only_clear_result_is_clear() {
        let check = |result: Option<&str>| CheckResponse {
            id: "c".into(),
            status: Some("complete".into()),
            result: result.map(Into::into),
        };
        assert!(check(Some("clear")).is_clear());
        assert!(!check(Some("consider")).is_clear());
        assert!(!check(None).is_clear());
    }
}
