//! sw-feed
//!
//! Order feed boundary: fetch the most recent orders for the configured shop,
//! newest first. Pure request/response; no state and no retries. Retry policy
//! belongs to the scheduling loop.

mod error;
mod etsy;

pub use error::FeedError;
pub use etsy::EtsyReceiptsFeed;

use sw_schemas::FeedPage;

/// Upstream order feed contract.
///
/// Object-safe so the daemon can hold an `Arc<dyn OrderFeed>`, and
/// `Send + Sync` so it can cross task boundaries.
#[async_trait::async_trait]
pub trait OrderFeed: Send + Sync {
    /// Human-readable source name (e.g. `"etsy"`).
    fn source_name(&self) -> &'static str;

    /// Fetch up to `limit` orders, newest first.
    async fn fetch_recent_orders(&self, limit: u32) -> Result<FeedPage, FeedError>;
}
