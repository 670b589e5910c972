//! Token records and review shapes
//!
//! Three review shapes exist on purpose: `ReviewSubmission` is what the
//! authority hands the ledger, `LedgerReview` is what the ledger hands back
//! (wide integers intact), and `Review` is what callers receive.

use crate::identifiers::{ProductId, ReviewToken, UserId};
use crate::normalize::LedgerUint;
use serde::{Deserialize, Serialize};

/// Review rating as supplied by the client
///
/// Conventionally 1-5; the bound is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(pub u64);

impl Rating {
    /// Raw rating value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Rating {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Lifecycle state of a review token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Issued and not yet consumed (`used = false`)
    Issued,
    /// Claimed by a submission (`used = true`)
    Claimed,
}

/// Stored binding between a token and the user/product pair it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// The token this record is keyed by
    pub token: ReviewToken,
    /// Requester the token was issued to
    pub user_id: UserId,
    /// Product the token permits a review of
    pub product_id: ProductId,
    /// Whether the token has been claimed
    pub used: bool,
}

impl TokenRecord {
    /// Create a fresh, unused record
    pub fn issued(token: ReviewToken, user_id: UserId, product_id: ProductId) -> Self {
        Self {
            token,
            user_id,
            product_id,
            used: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TokenState {
        if self.used {
            TokenState::Claimed
        } else {
            TokenState::Issued
        }
    }
}

/// Review forwarded to the ledger writer
///
/// Identity fields always come from the token record, never from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// Author, taken from the token record
    pub user_id: UserId,
    /// Reviewed product, taken from the token record
    pub product_id: ProductId,
    /// Client-supplied rating
    pub rating: Rating,
    /// Client-supplied comment
    pub comment: String,
}

/// Review record as stored on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReview {
    /// Author recorded on the ledger
    pub user_id: String,
    /// Product recorded on the ledger
    pub product_id: String,
    /// Rating as a ledger integer
    pub rating: LedgerUint,
    /// Free-form comment
    pub comment: String,
    /// Ledger timestamp (seconds)
    pub timestamp: LedgerUint,
}

/// Review as returned to callers, numerics rendered as decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Author of the review
    pub user_id: String,
    /// Reviewed product
    pub product_id: String,
    /// Rating in decimal
    pub rating: String,
    /// Free-form comment
    pub comment: String,
    /// Ledger timestamp in decimal seconds
    pub timestamp: String,
}

/// Acknowledgement returned after a review reached the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Always `true` for a returned receipt
    pub success: bool,
    /// Human-readable status
    pub message: String,
}

impl SubmissionReceipt {
    /// Receipt for a review the ledger accepted
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: "Review submitted".to_string(),
        }
    }
}
