//! In-memory collaborators for shopwatch scenario tests.
//!
//! No network I/O. Everything is deterministic and inspectable after the
//! fact.

pub mod feed;
pub mod sink;

pub use feed::ScriptedFeed;
pub use sink::{RecordingSink, SentMessage};

use sw_schemas::{FeedPage, Money, Order, OrderId};

/// Order with a deterministic total and timestamp derived from `seq`.
pub fn order(id: &str, seq: i64) -> Order {
    Order {
        id: OrderId::from(id),
        created_at: 1_700_000_000 + seq * 60,
        total: Money::new(1_000 + seq, 100),
        buyer_name: Some(format!("buyer-{id}")),
        status: Some("paid".to_string()),
    }
}

/// Newest-first page from ids given newest first.
///
/// Creation times descend with position so the page is internally consistent.
pub fn page(ids_newest_first: &[&str]) -> FeedPage {
    let n = ids_newest_first.len() as i64;
    FeedPage::new(
        ids_newest_first
            .iter()
            .enumerate()
            .map(|(i, id)| order(id, n - i as i64))
            .collect(),
    )
}

pub fn ids(orders: &[Order]) -> Vec<String> {
    orders.iter().map(|o| o.id.to_string()).collect()
}
