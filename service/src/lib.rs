//! KYC gate service layer.
//!
//! [`KycService`] runs the end-to-end flows on top of the core:
//! 1. **Register**: checksum gate, field validation, ownership proof, applicant, SDK token
//! 2. **Request check**: start the vendor check once per user
//! 3. **Webhook**: authenticate, fetch the result, complete the check
//! 4. **Override**: operator-forced acceptance behind a flag and a token
//!
//! Collaborators (store, vendor, chain) are passed in; see `kyc-nullables`
//! for in-memory stand-ins.

pub mod config;
pub mod error;
pub mod service;
pub mod validation;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use service::{CheckRequested, KycService, Registered, Registration, UserStatus, WebhookOutcome};
