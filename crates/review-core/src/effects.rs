//! Ledger effect traits
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `review-effects`
//! - **Usage**: `review-authority` forwards reviews and queries through these
//!
//! The ledger is an external append-style store. Implementations may block
//! for network latency; callers must not hold locks across these calls.

use crate::errors::LedgerError;
use crate::identifiers::ProductId;
use crate::review::{LedgerReview, ReviewSubmission};
use async_trait::async_trait;
use std::sync::Arc;

/// Write side of the review ledger
#[async_trait]
pub trait LedgerWriteEffects: Send + Sync {
    /// Append one review. No automatic retry is expected of callers.
    async fn add_review(&self, submission: &ReviewSubmission) -> Result<(), LedgerError>;
}

/// Read side of the review ledger
#[async_trait]
pub trait LedgerReadEffects: Send + Sync {
    /// All reviews recorded for a product, in ledger order
    async fn reviews_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<LedgerReview>, LedgerError>;
}

/// Combined ledger surface
pub trait LedgerEffects: LedgerWriteEffects + LedgerReadEffects {}

impl<T> LedgerEffects for T where T: LedgerWriteEffects + LedgerReadEffects + ?Sized {}

#[async_trait]
impl<T> LedgerWriteEffects for Arc<T>
where
    T: LedgerWriteEffects + ?Sized,
{
    async fn add_review(&self, submission: &ReviewSubmission) -> Result<(), LedgerError> {
        (**self).add_review(submission).await
    }
}

#[async_trait]
impl<T> LedgerReadEffects for Arc<T>
where
    T: LedgerReadEffects + ?Sized,
{
    async fn reviews_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<LedgerReview>, LedgerError> {
        (**self).reviews_by_product(product_id).await
    }
}
