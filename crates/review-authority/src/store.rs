//! In-memory token store
//!
//! Every read-check-write on a record happens under one mutex. Records are
//! never removed, so a consumed token stays observable as claimed for the
//! lifetime of the process.

use parking_lot::Mutex;
use review_core::{ProductId, ReviewError, ReviewToken, TokenRecord, TokenState, UserId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Source of fresh token values
pub type TokenGenerator = Arc<dyn Fn() -> ReviewToken + Send + Sync>;

/// Counters describing the store contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenStoreStats {
    /// Tokens ever issued
    pub issued: usize,
    /// Tokens currently claimed
    pub claimed: usize,
}

/// Process-lifetime store of issued review tokens
pub struct TokenStore {
    records: Mutex<HashMap<ReviewToken, TokenRecord>>,
    generator: TokenGenerator,
}

impl TokenStore {
    /// Create an empty store minting random v4 UUID tokens
    pub fn new() -> Self {
        Self::with_generator(Arc::new(ReviewToken::generate))
    }

    /// Create an empty store with a custom token source
    pub fn with_generator(generator: TokenGenerator) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            generator,
        }
    }

    /// Insert a fresh unused record and return its token
    ///
    /// A generated value that collides with an existing record is discarded
    /// and another is drawn, so the returned token was never issued before.
    pub fn issue(&self, user_id: UserId, product_id: ProductId) -> ReviewToken {
        let mut records = self.records.lock();
        let token = loop {
            let candidate = (self.generator)();
            if !records.contains_key(&candidate) {
                break candidate;
            }
            debug!(token = %candidate, "discarding colliding review token");
        };
        records.insert(
            token.clone(),
            TokenRecord::issued(token.clone(), user_id, product_id),
        );
        token
    }

    /// Claim an unused token, returning a snapshot of its record
    ///
    /// The lookup, the `used` check and the flip to `used = true` form a
    /// single critical section.
    pub fn claim(&self, token: &ReviewToken) -> Result<TokenRecord, ReviewError> {
        let mut records = self.records.lock();
        let record = records.get_mut(token).ok_or(ReviewError::InvalidToken)?;
        if record.used {
            return Err(ReviewError::TokenAlreadyUsed);
        }
        record.used = true;
        Ok(record.clone())
    }

    /// Undo a claim after a failed downstream write
    ///
    /// Returns `true` if the token went from claimed back to issued.
    pub fn release(&self, token: &ReviewToken) -> bool {
        let mut records = self.records.lock();
        match records.get_mut(token) {
            Some(record) if record.used => {
                record.used = false;
                true
            }
            _ => false,
        }
    }

    /// Lifecycle state of a token, if it was ever issued
    pub fn state(&self, token: &ReviewToken) -> Option<TokenState> {
        self.records.lock().get(token).map(TokenRecord::state)
    }

    /// Snapshot of a token's record
    pub fn record(&self, token: &ReviewToken) -> Option<TokenRecord> {
        self.records.lock().get(token).cloned()
    }

    /// Current store counters
    pub fn stats(&self) -> TokenStoreStats {
        let records = self.records.lock();
        TokenStoreStats {
            issued: records.len(),
            claimed: records.values().filter(|r| r.used).count(),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ids() -> (UserId, ProductId) {
        (
            UserId::new("alice").unwrap(),
            ProductId::new("Product-A").unwrap(),
        )
    }

    #[test]
    fn claim_is_single_shot() {
        let store = TokenStore::new();
        let (user, product) = ids();
        let token = store.issue(user, product);

        let record = store.claim(&token).unwrap();
        assert_eq!(record.user_id.as_str(), "alice");
        assert!(record.used);
        assert_eq!(store.claim(&token), Err(ReviewError::TokenAlreadyUsed));
    }

    #[test]
    fn unknown_token_leaves_store_untouched() {
        let store = TokenStore::new();
        let (user, product) = ids();
        let issued = store.issue(user, product);

        assert_eq!(
            store.claim(&ReviewToken::from("bogus-token")),
            Err(ReviewError::InvalidToken)
        );
        assert_eq!(store.state(&issued), Some(TokenState::Issued));
        assert_eq!(store.stats(), TokenStoreStats { issued: 1, claimed: 0 });
    }

    #[test]
    fn release_only_reverts_claimed_tokens() {
        let store = TokenStore::new();
        let (user, product) = ids();
        let token = store.issue(user, product);

        assert!(!store.release(&token));
        store.claim(&token).unwrap();
        assert!(store.release(&token));
        assert_eq!(store.state(&token), Some(TokenState::Issued));
        assert!(!store.release(&ReviewToken::from("never-issued")));
    }

    #[test]
    fn colliding_generated_values_are_redrawn() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sequence = ["dup", "dup", "fresh"];
        let store = TokenStore::with_generator(Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            ReviewToken::from(sequence[n.min(sequence.len() - 1)])
        }));

        let (user, product) = ids();
        let first = store.issue(user.clone(), product.clone());
        let second = store.issue(user, product);

        assert_eq!(first.as_str(), "dup");
        assert_eq!(second.as_str(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.stats().issued, 2);
    }
}
