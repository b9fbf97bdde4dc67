//! Shared utilities for the KYC gate.

pub mod logging;
pub mod shutdown;

pub use logging::{init_tracing, LogFormat};
pub use shutdown::ShutdownController;
