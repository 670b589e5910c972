//! Review token authority
//!
//! Per-token state machine:
//!
//! ```text
//! ISSUED (used=false) --claim--> CLAIMED (used=true)
//!        ^                              |
//!        +------ ledger write failed ---+
//! ```
//!
//! The claim is taken under the store lock; the ledger call happens after the
//! lock is released. Only a ledger error returned to the authority releases a
//! claim. A submission dropped mid-write leaves the token claimed, since the
//! write may already have landed.

use crate::store::{TokenStore, TokenStoreStats};
use review_core::{
    normalize_reviews, LedgerReadEffects, LedgerWriteEffects, ProductId, Rating, Result, Review,
    ReviewError, ReviewSubmission, ReviewToken, SubmissionReceipt, TokenState, UserId,
};
use tracing::{error, info, warn};

/// Issues single-use review tokens and mediates ledger access
#[derive(Debug)]
pub struct ReviewTokenAuthority<L> {
    store: TokenStore,
    ledger: L,
}

impl<L> ReviewTokenAuthority<L>
where
    L: LedgerWriteEffects + LedgerReadEffects,
{
    /// Create an authority with an empty token store
    pub fn new(ledger: L) -> Self {
        Self::with_store(TokenStore::new(), ledger)
    }

    /// Create an authority over an existing store
    pub fn with_store(store: TokenStore, ledger: L) -> Self {
        Self { store, ledger }
    }

    /// Issue a token binding `user_id` to a single review of `product_id`
    pub fn issue_token(&self, user_id: &str, product_id: &str) -> Result<ReviewToken> {
        let user_id = UserId::new(user_id)?;
        let product_id = ProductId::new(product_id)?;
        let token = self.store.issue(user_id.clone(), product_id.clone());
        info!(%token, %user_id, %product_id, "issued review token");
        Ok(token)
    }

    /// Redeem a token and forward the review to the ledger
    ///
    /// Author and product are taken from the token record. On ledger failure
    /// the token is restored to unused before the error is returned.
    pub async fn submit_review(
        &self,
        token: Option<&str>,
        rating: Rating,
        comment: impl Into<String>,
    ) -> Result<SubmissionReceipt> {
        let token = ReviewToken::from_client(token)?;
        let record = self.store.claim(&token).map_err(|err| {
            warn!(%token, error = %err, "rejected review submission");
            err
        })?;

        let submission = ReviewSubmission {
            user_id: record.user_id,
            product_id: record.product_id,
            rating,
            comment: comment.into(),
        };

        match self.ledger.add_review(&submission).await {
            Ok(()) => {
                info!(
                    %token,
                    user_id = %submission.user_id,
                    product_id = %submission.product_id,
                    rating = submission.rating.value(),
                    "review recorded on ledger"
                );
                Ok(SubmissionReceipt::accepted())
            }
            Err(source) => {
                self.store.release(&token);
                error!(%token, error = %source, "ledger write failed, token restored");
                Err(ReviewError::LedgerWrite { source })
            }
        }
    }

    /// Reviews recorded on the ledger for a product, numerics stringified
    pub async fn list_reviews(&self, product_id: &str) -> Result<Vec<Review>> {
        let product_id = ProductId::new(product_id)?;
        let records = self
            .ledger
            .reviews_by_product(&product_id)
            .await
            .map_err(|source| {
                error!(%product_id, error = %source, "ledger read failed");
                ReviewError::LedgerRead { source }
            })?;
        Ok(normalize_reviews(records))
    }

    /// Lifecycle state of a token, `None` if it was never issued
    pub fn token_state(&self, token: &str) -> Option<TokenState> {
        self.store.state(&ReviewToken::from(token))
    }

    /// Token store counters
    pub fn stats(&self) -> TokenStoreStats {
        self.store.stats()
    }

    /// Borrow the ledger handler
    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}
