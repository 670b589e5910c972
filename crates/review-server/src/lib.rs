//! # Review Gate Server
//!
//! HTTP front for the review token authority: configuration, ledger handler
//! selection and the axum router. The `review-gate` binary wires these
//! together.

#![forbid(unsafe_code)]

/// Routes, request/response bodies and error mapping
pub mod api;

/// Server configuration
pub mod config;

/// Ledger handler selection
pub mod ledger;

pub use api::{router, ApiError, SharedAuthority, SharedLedger};
pub use config::{ConfigError, LedgerBackend, LedgerConfig, ServerConfig};
pub use ledger::build_ledger;
