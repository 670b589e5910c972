//! Identifier types used across Review Gate
//!
//! User and product identifiers come from untrusted clients, so construction
//! validates them. Review tokens are minted here and nowhere else.

use crate::errors::ReviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the user requesting or writing a review
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user identifier, rejecting empty or whitespace-only input
    pub fn new(value: impl Into<String>) -> Result<Self, ReviewError> {
        non_empty(value.into(), "userId").map(Self)
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the product a review is about
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier, rejecting empty or whitespace-only input
    pub fn new(value: impl Into<String>) -> Result<Self, ReviewError> {
        non_empty(value.into(), "productId").map(Self)
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_empty(value: String, field: &str) -> Result<String, ReviewError> {
    if value.trim().is_empty() {
        return Err(ReviewError::invalid_request(format!("{field} is required")));
    }
    Ok(value)
}

macro_rules! string_id_conversions {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = ReviewError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_conversions!(UserId);
string_id_conversions!(ProductId);

/// Opaque single-use review token
///
/// Freshly minted tokens are random v4 UUIDs drawn from the OS RNG. Tokens
/// presented by clients are kept verbatim; an unknown value simply fails the
/// store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewToken(String);

impl ReviewToken {
    /// Mint a new unguessable token
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a client-supplied token verbatim, rejecting absent or blank values
    pub fn from_client(value: Option<&str>) -> Result<Self, ReviewError> {
        match value {
            Some(token) if !token.trim().is_empty() => Ok(Self(token.to_string())),
            _ => Err(ReviewError::MissingToken),
        }
    }

    /// Borrow the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ReviewToken> for String {
    fn from(token: ReviewToken) -> Self {
        token.0
    }
}

// Wraps a raw value as-is, for lookups and deterministic token sources.
impl From<&str> for ReviewToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
