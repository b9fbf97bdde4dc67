//! HTTP API for the KYC gate.
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/v1/users/0x{address}` | verification status |
//! | POST | `/v1/users/0x{address}` | register, returns an SDK token |
//! | PUT | `/v1/users/0x{address}` | request the vendor check |
//! | POST | `/v1/users/0x{address}/accept` | operator override (Bearer token) |
//! | POST | `/v1/webhooks/onfido` | vendor callback (`X-Signature` HMAC) |
//! | GET | `/v1/check` | liveness |

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
