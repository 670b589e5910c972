//! Unified error system for Review Gate
//!
//! `ReviewError` is the only error the token authority reports. Ledger
//! collaborators report `LedgerError`, which the authority wraps into the
//! write or read variant depending on the operation that failed.

use serde::{Deserialize, Serialize};

/// Error reported by a ledger collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// The ledger could not be reached or did not answer in time
    #[error("Ledger unavailable: {message}")]
    Unavailable {
        /// Error message describing the transport failure
        message: String,
    },

    /// The ledger answered but refused the operation
    #[error("Ledger rejected request: {message}")]
    Rejected {
        /// Status reported by the ledger gateway, when there is one
        status: Option<u16>,
        /// Error message describing the rejection
        message: String,
    },

    /// The ledger answered with data that could not be decoded
    #[error("Malformed ledger response: {message}")]
    Malformed {
        /// Error message describing the decoding failure
        message: String,
    },
}

impl LedgerError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a rejection error
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the review token authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ReviewError {
    /// Malformed caller input
    #[error("{message}")]
    InvalidRequest {
        /// Error message describing what the caller must correct
        message: String,
    },

    /// No review token was supplied
    #[error("reviewToken is required")]
    MissingToken,

    /// The supplied review token was never issued
    #[error("Invalid token")]
    InvalidToken,

    /// The supplied review token has already been consumed
    #[error("Token already used")]
    TokenAlreadyUsed,

    /// Forwarding the review to the ledger failed; the token was restored
    #[error("Failed to record review on ledger: {source}")]
    LedgerWrite {
        /// Underlying ledger failure
        source: LedgerError,
    },

    /// Reading reviews from the ledger failed
    #[error("Failed to read reviews from ledger: {source}")]
    LedgerRead {
        /// Underlying ledger failure
        source: LedgerError,
    },
}

impl ReviewError {
    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the caller caused this error and can fix it by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::LedgerWrite { .. } | Self::LedgerRead { .. })
    }

    /// Whether a presented token was refused (unknown or already redeemed)
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::TokenAlreadyUsed)
    }
}

/// Standard Result type for Review Gate operations
pub type Result<T> = std::result::Result<T, ReviewError>;
