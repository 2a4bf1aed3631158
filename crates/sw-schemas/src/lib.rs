//! sw-schemas
//!
//! Shared data model for shopwatch: orders as observed on the marketplace
//! feed, and the newest-first page the feed client hands to the detector.
//!
//! Everything here is plain data. No IO, no clocks.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Opaque marketplace order identifier.
///
/// The marketplace assigns ids in creation order, but they are not promised
/// to be numerically sortable, so nothing in the workspace compares them
/// other than for equality. On the wire an id may be a JSON number
/// (`"receipt_id": 123`) or a string; both decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Str(String),
            Int(i64),
            Uint(u64),
        }

        let id = match Wire::deserialize(d)? {
            Wire::Str(s) => s,
            Wire::Int(n) => n.to_string(),
            Wire::Uint(n) => n.to_string(),
        };
        if id.trim().is_empty() {
            return Err(serde::de::Error::custom("order id must not be empty"));
        }
        Ok(Self(id))
    }
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Fixed-point currency value: `amount / divisor` units of `currency_code`.
///
/// Kept as integers end-to-end; no float conversion anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub divisor: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

impl Money {
    pub fn new(amount: i64, divisor: i64) -> Self {
        Self {
            amount,
            divisor,
            currency_code: None,
        }
    }

    /// Rendered as the raw pair `"{amount}/{divisor}"`.
    pub fn render(&self) -> String {
        format!("{}/{}", self.amount, self.divisor)
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// One marketplace order. Received fresh on every fetch, never mutated.
///
/// Field names follow the marketplace receipt payload; only the fields the
/// notifier needs are decoded, everything else in the record is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "receipt_id")]
    pub id: OrderId,
    /// Creation time, UTC epoch seconds.
    #[serde(rename = "create_timestamp")]
    pub created_at: i64,
    #[serde(rename = "grandtotal")]
    pub total: Money,
    #[serde(rename = "name", default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Order {
    /// Creation time as a UTC datetime, or `None` if the epoch value is out of
    /// chrono's range.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

// ---------------------------------------------------------------------------
// FeedPage
// ---------------------------------------------------------------------------

/// Most recent orders for one shop, newest first.
///
/// The page position is the only ordering oracle: element 0 is the newest
/// order. Timestamps are never used for sequencing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedPage(Vec<Order>);

impl FeedPage {
    pub fn new(orders_newest_first: Vec<Order>) -> Self {
        Self(orders_newest_first)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn newest(&self) -> Option<&Order> {
        self.0.first()
    }

    /// Orders in feed order (newest first).
    pub fn orders(&self) -> &[Order] {
        &self.0
    }

    /// Drop anything past `limit`, keeping the newest entries.
    pub fn truncate(&mut self, limit: usize) {
        self.0.truncate(limit);
    }

    pub fn into_orders(self) -> Vec<Order> {
        self.0
    }
}
