//! Wide ledger integers and response normalization
//!
//! Ledger numerics (ratings, block timestamps) are unsigned integers that may
//! exceed what a JSON consumer can represent exactly. They are carried as
//! `LedgerUint` internally and converted to decimal strings in exactly one
//! place: [`normalize_reviews`].

use crate::review::{LedgerReview, Review};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unsigned ledger integer, up to 128 bits
///
/// Deserializes from a JSON integer or a decimal string. Integers too large
/// for a 64-bit JSON number must be sent as strings; a float is rejected
/// rather than silently rounded. Serializes as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LedgerUint(pub u128);

impl LedgerUint {
    /// Decimal rendering
    pub fn to_decimal_string(self) -> String {
        self.0.to_string()
    }
}

impl From<u64> for LedgerUint {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u128> for LedgerUint {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for LedgerUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LedgerUint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u128>().map(Self)
    }
}

impl Serialize for LedgerUint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LedgerUint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LedgerUintVisitor)
    }
}

struct LedgerUintVisitor;

impl<'de> Visitor<'de> for LedgerUintVisitor {
    type Value = LedgerUint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(LedgerUint::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(LedgerUint(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(LedgerUint::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse::<LedgerUint>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl From<LedgerReview> for Review {
    fn from(record: LedgerReview) -> Self {
        Self {
            user_id: record.user_id,
            product_id: record.product_id,
            rating: record.rating.to_decimal_string(),
            comment: record.comment,
            timestamp: record.timestamp.to_decimal_string(),
        }
    }
}

/// Shape ledger records for callers, stringifying every wide numeric field
pub fn normalize_reviews(records: Vec<LedgerReview>) -> Vec<Review> {
    records.into_iter().map(Review::from).collect()
}
