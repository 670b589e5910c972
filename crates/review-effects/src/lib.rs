//! # Review Gate Effects
//!
//! Ledger effect handlers implementing the traits from `review-core`.
//!
//! - [`MemoryLedgerHandler`]: append-only in-process ledger with fault
//!   injection, used for development runs and tests
//! - [`HttpLedgerHandler`]: client for an HTTP gateway in front of the review
//!   contract

#![forbid(unsafe_code)]

/// HTTP ledger gateway handler
pub mod http;

/// In-memory ledger handler
pub mod memory;

pub use http::HttpLedgerHandler;
pub use memory::{LedgerClock, MemoryLedgerHandler};
