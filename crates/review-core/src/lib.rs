//! # Review Gate Core
//!
//! **Purpose**: Define the domain types, the unified error, and the ledger
//! effect interfaces shared by every Review Gate crate.
//!
//! # Architecture Constraints
//!
//! - YES identifier newtypes, token records and review shapes
//! - YES ledger effect traits (`LedgerWriteEffects`, `LedgerReadEffects`)
//! - YES wide-integer normalization at the response boundary
//! - NO effect handler implementations (those live in `review-effects`)
//! - NO token lifecycle logic (that is `review-authority`)
//! - NO transport or HTTP concerns (that is `review-server`)

#![forbid(unsafe_code)]

/// Unified error types
pub mod errors;

/// Ledger effect traits
pub mod effects;

/// Identifier newtypes
pub mod identifiers;

/// Wide ledger integers and their decimal-string normalization
pub mod normalize;

/// Token records and review shapes
pub mod review;

pub use effects::{LedgerEffects, LedgerReadEffects, LedgerWriteEffects};
pub use errors::{LedgerError, Result, ReviewError};
pub use identifiers::{ProductId, ReviewToken, UserId};
pub use normalize::{normalize_reviews, LedgerUint};
pub use review::{
    LedgerReview, Rating, Review, ReviewSubmission, SubmissionReceipt, TokenRecord, TokenState,
};
