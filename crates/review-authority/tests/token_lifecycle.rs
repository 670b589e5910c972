//! Token lifecycle scenarios against the in-memory ledger

use async_trait::async_trait;
use futures::future::join_all;
use review_authority::ReviewTokenAuthority;
use review_core::{
    LedgerError, LedgerReadEffects, LedgerReview, LedgerUint, LedgerWriteEffects, ProductId,
    Rating, ReviewError, ReviewSubmission, SubmissionReceipt, TokenState,
};
use review_effects::MemoryLedgerHandler;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ledger that accepts the write, then stalls before acknowledging it
#[derive(Default)]
struct StallingLedger {
    written: Mutex<Vec<ReviewSubmission>>,
}

#[async_trait]
impl LedgerWriteEffects for StallingLedger {
    async fn add_review(&self, submission: &ReviewSubmission) -> Result<(), LedgerError> {
        self.written.lock().unwrap().push(submission.clone());
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

#[async_trait]
impl LedgerReadEffects for StallingLedger {
    async fn reviews_by_product(
        &self,
        _product_id: &ProductId,
    ) -> Result<Vec<LedgerReview>, LedgerError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn single_use_review_end_to_end() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());

    let t1 = authority.issue_token("alice", "Product-A").unwrap();
    let first = authority
        .submit_review(Some(t1.as_str()), Rating(5), "great")
        .await;
    assert_eq!(first, Ok(SubmissionReceipt::accepted()));

    let entries = authority.ledger().entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, "alice");
    assert_eq!(entries[0].product_id, "Product-A");
    assert_eq!(entries[0].rating, LedgerUint(5));
    assert_eq!(entries[0].comment, "great");

    let replay = authority
        .submit_review(Some(t1.as_str()), Rating(3), "meh")
        .await;
    assert_eq!(replay, Err(ReviewError::TokenAlreadyUsed));
    assert_eq!(authority.ledger().entries().await.len(), 1);
    assert_eq!(authority.token_state(t1.as_str()), Some(TokenState::Claimed));
}

#[tokio::test]
async fn bogus_token_is_invalid_and_mutates_nothing() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());
    let issued = authority.issue_token("alice", "Product-A").unwrap();

    let result = authority
        .submit_review(Some("bogus-token"), Rating(4), "ok")
        .await;

    assert_eq!(result, Err(ReviewError::InvalidToken));
    assert_eq!(authority.token_state(issued.as_str()), Some(TokenState::Issued));
    assert_eq!(authority.token_state("bogus-token"), None);
    assert_eq!(authority.stats().claimed, 0);
    assert_eq!(authority.ledger().write_attempts(), 0);
}

#[tokio::test]
async fn tokens_are_matched_exactly() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());
    let token = authority.issue_token("alice", "Product-A").unwrap();
    let padded = format!(" {token} ");

    let result = authority
        .submit_review(Some(padded.as_str()), Rating(4), "ok")
        .await;

    assert_eq!(result, Err(ReviewError::InvalidToken));
    assert_eq!(authority.token_state(token.as_str()), Some(TokenState::Issued));
}

#[tokio::test]
async fn issued_tokens_are_unique() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());

    let mut seen = HashSet::new();
    for i in 0..500 {
        let token = authority
            .issue_token(&format!("user-{}", i % 7), "Product-A")
            .unwrap();
        assert!(seen.insert(token), "token issued twice");
    }
    assert_eq!(authority.stats().issued, 500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_claim_exactly_once() {
    let ledger = MemoryLedgerHandler::new().with_write_latency(Duration::from_millis(25));
    let authority = Arc::new(ReviewTokenAuthority::new(ledger));
    let token = authority.issue_token("alice", "Product-A").unwrap();

    let attempts = (0..16).map(|i| {
        let authority = authority.clone();
        let token = token.clone();
        tokio::spawn(async move {
            authority
                .submit_review(Some(token.as_str()), Rating(5), format!("attempt {i}"))
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(ReviewError::TokenAlreadyUsed)))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(rejected, 15);
    assert_eq!(authority.ledger().write_attempts(), 1);
    assert_eq!(authority.ledger().entries().await.len(), 1);
}

#[tokio::test]
async fn ledger_failure_restores_token_for_retry() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());
    let token = authority.issue_token("alice", "Product-A").unwrap();
    authority.ledger().fail_next_writes(1);

    let failed = authority
        .submit_review(Some(token.as_str()), Rating(5), "great")
        .await;
    assert!(matches!(failed, Err(ReviewError::LedgerWrite { .. })));
    assert_eq!(authority.token_state(token.as_str()), Some(TokenState::Issued));
    assert!(authority.ledger().entries().await.is_empty());

    let retried = authority
        .submit_review(Some(token.as_str()), Rating(5), "great")
        .await;
    assert_eq!(retried, Ok(SubmissionReceipt::accepted()));
    assert_eq!(authority.token_state(token.as_str()), Some(TokenState::Claimed));
    assert_eq!(authority.ledger().entries().await.len(), 1);
}

#[tokio::test]
async fn abandoned_submission_cannot_be_redeemed_again() {
    let authority = ReviewTokenAuthority::new(StallingLedger::default());
    let token = authority.issue_token("alice", "Product-A").unwrap();

    let first = tokio::time::timeout(
        Duration::from_millis(20),
        authority.submit_review(Some(token.as_str()), Rating(5), "great"),
    )
    .await;
    assert!(first.is_err());
    assert_eq!(authority.token_state(token.as_str()), Some(TokenState::Claimed));

    let second = tokio::time::timeout(
        Duration::from_millis(20),
        authority.submit_review(Some(token.as_str()), Rating(1), "again"),
    )
    .await;
    assert_eq!(second, Ok(Err(ReviewError::TokenAlreadyUsed)));
    assert_eq!(authority.ledger().written.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn persistent_ledger_failure_keeps_token_retryable() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());
    let token = authority.issue_token("bob", "Product-B").unwrap();
    authority.ledger().set_write_failure(true);

    for _ in 0..3 {
        let result = authority
            .submit_review(Some(token.as_str()), Rating(2), "slow shipping")
            .await;
        assert!(matches!(result, Err(ReviewError::LedgerWrite { .. })));
        assert_eq!(authority.token_state(token.as_str()), Some(TokenState::Issued));
    }
    assert_eq!(authority.ledger().write_attempts(), 3);
}

#[tokio::test]
async fn listing_returns_stringified_reviews() {
    let ledger = MemoryLedgerHandler::new().with_clock(Arc::new(|| 1_700_000_000u128));
    let authority = ReviewTokenAuthority::new(ledger);

    assert!(authority.list_reviews("Product-A").await.unwrap().is_empty());

    let token = authority.issue_token("alice", "Product-A").unwrap();
    authority
        .submit_review(Some(token.as_str()), Rating(4), "solid")
        .await
        .unwrap();

    let reviews = authority.list_reviews("Product-A").await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].user_id, "alice");
    assert_eq!(reviews[0].rating, "4");
    assert_eq!(reviews[0].timestamp, "1700000000");
    assert!(authority.list_reviews("Product-B").await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_requires_product() {
    let authority = ReviewTokenAuthority::new(MemoryLedgerHandler::new());

    let result = authority.list_reviews(" ").await;
    assert!(matches!(result, Err(ReviewError::InvalidRequest { .. })));
}
