//! Receipts-endpoint implementation of [`OrderFeed`].

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use sw_schemas::{FeedPage, Order};
use tracing::debug;

use crate::{FeedError, OrderFeed};

const API_KEY_HEADER: &str = "x-api-key";

/// Polls `GET /v3/application/shops/{shop_id}/receipts`, newest first.
///
/// The API key is passed in by the caller; it is never logged.
#[derive(Clone)]
pub struct EtsyReceiptsFeed {
    http: reqwest::Client,
    api_key: String,
    shop_id: String,
    base_url: String,
}

impl std::fmt::Debug for EtsyReceiptsFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtsyReceiptsFeed")
            .field("shop_id", &self.shop_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl EtsyReceiptsFeed {
    pub fn new(
        api_key: String,
        shop_id: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build receipts http client")?;

        Ok(Self {
            http,
            api_key,
            shop_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn receipts_url(&self) -> String {
        format!(
            "{}/v3/application/shops/{}/receipts",
            self.base_url, self.shop_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct ReceiptsResponse {
    /// Absent and `null` both mean no orders.
    #[serde(default)]
    results: Option<Vec<Order>>,
}

#[async_trait::async_trait]
impl OrderFeed for EtsyReceiptsFeed {
    fn source_name(&self) -> &'static str {
        "etsy"
    }

    async fn fetch_recent_orders(&self, limit: u32) -> Result<FeedPage, FeedError> {
        let limit_s = limit.to_string();

        let resp = self
            .http
            .get(self.receipts_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .query(&[
                ("limit", limit_s.as_str()),
                ("sort_on", "created"),
                ("sort_order", "desc"),
            ])
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FeedError::Unauthorized);
        }
        if !status.is_success() {
            return Err(FeedError::Unavailable {
                status: status.as_u16(),
            });
        }

        let body: ReceiptsResponse = resp
            .json()
            .await
            .map_err(|e| FeedError::Transport(format!("receipts decode failed: {e}")))?;

        let mut page = FeedPage::new(body.results.unwrap_or_default());
        page.truncate(limit as usize);
        debug!(shop_id = %self.shop_id, orders = page.len(), "receipts fetched");
        Ok(page)
    }
}
