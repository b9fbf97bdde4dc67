//! Identity-verification vendor integration.
//!
//! The vendor owns document and biometric verification. The gate only opens
//! applicants, starts checks, reads their outcome, hands out SDK tokens and
//! receives `check.completed` webhooks.

pub mod client;
pub mod error;
pub mod types;

pub use client::{IdentityProvider, OnfidoClient};
pub use error::ProviderError;
pub use types::{NewApplicant, WebhookEvent, WebhookPayload};
