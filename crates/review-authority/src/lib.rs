//! # Review Token Authority
//!
//! Mediates between an untrusted client and the write-once review ledger by
//! issuing short-lived, single-use capability tokens.
//!
//! ## Core Concepts
//!
//! - **Token store**: explicit, process-lifetime map from token to record,
//!   created at service start and shared by handle
//! - **Claim**: atomic `used: false -> true` flip under the store lock
//! - **Rollback**: a claim whose ledger write fails is released, so the same
//!   token can be retried
//!
//! The store never persists; a restart forgets every issued token.

#![forbid(unsafe_code)]

/// Token lifecycle orchestration
pub mod authority;

/// Lock-guarded token record store
pub mod store;

pub use authority::ReviewTokenAuthority;
pub use store::{TokenGenerator, TokenStore, TokenStoreStats};
