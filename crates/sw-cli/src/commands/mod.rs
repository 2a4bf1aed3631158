//! Command handlers for the `sw` CLI.
//!
//! Every command prints JSON on stdout so output can be piped into `jq`.
//! Nothing here touches detector state; `feed` and `render` never post to
//! the channel.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::time::Duration;
use sw_feed::{EtsyReceiptsFeed, OrderFeed};
use sw_schemas::{Money, Order, OrderId};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn print_json(v: &impl serde::Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(v).context("serialize output failed")?
    );
    Ok(())
}

/// Order used by `render` when no file is given.
pub fn sample_order() -> Order {
    Order {
        id: OrderId::from("1234567890"),
        created_at: 1_700_000_000,
        total: Money::new(4550, 100),
        buyer_name: Some("Sample Buyer".to_string()),
        status: Some("Paid".to_string()),
    }
}

/// Read one receipt record from `path`. A UTF-8 BOM is tolerated.
pub fn load_order(path: &str) -> Result<Order> {
    let bytes = fs::read(path).with_context(|| format!("read order-file failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).context("order-file must be UTF-8 text")?;
    serde_json::from_str(raw.trim()).context("order-file must contain one receipt record")
}

// ---------------------------------------------------------------------------
// config-check
// ---------------------------------------------------------------------------

pub fn config_check() -> Result<()> {
    let cfg = sw_config::resolve_config_from_env().context("configuration rejected")?;
    print_json(&cfg.summary())
}

// ---------------------------------------------------------------------------
// feed
// ---------------------------------------------------------------------------

pub async fn feed(limit: Option<u32>) -> Result<()> {
    let cfg = sw_config::resolve_config_from_env().context("configuration rejected")?;
    let limit = limit.unwrap_or(cfg.page_size);
    if limit == 0 || limit > sw_config::MAX_PAGE_SIZE {
        bail!(
            "invalid --limit {limit}. expected 1..={}",
            sw_config::MAX_PAGE_SIZE
        );
    }

    let feed = EtsyReceiptsFeed::new(
        cfg.etsy_api_key.clone(),
        cfg.shop_id.clone(),
        cfg.etsy_base_url.clone(),
        cfg.call_timeout,
    )?;
    let page = feed
        .fetch_recent_orders(limit)
        .await
        .with_context(|| format!("{} fetch failed", feed.source_name()))?;

    print_json(&page)
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

pub fn render(order_file: Option<String>) -> Result<()> {
    let order = match order_file {
        Some(p) => load_order(&p)?,
        None => sample_order(),
    };
    let embed = sw_notify::render_order_embed(&order);
    print_json(&serde_json::json!({ "embeds": [embed] }))
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

pub async fn check(addr: Option<String>) -> Result<()> {
    let addr = match addr {
        Some(a) => a,
        None => sw_config::resolve_daemon_addr_from_env()
            .context("configuration rejected")?
            .to_string(),
    };
    let url = format!("http://{addr}/v1/check");

    // A manual pass may queue behind a scheduled one.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .context("failed to build http client")?;
    let resp = http
        .post(&url)
        .send()
        .await
        .with_context(|| format!("daemon unreachable at {addr}"))?;

    let status = resp.status();
    let body: Value = resp.json().await.context("daemon returned non-JSON body")?;
    print_json(&body)?;

    if !status.is_success() {
        bail!("manual check failed: http status={}", status.as_u16());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_order_renders_every_field() {
        let e = sw_notify::render_order_embed(&sample_order());
        assert_eq!(e.field("Order ID"), Some("1234567890"));
        assert_eq!(e.field("Total"), Some("4550/100"));
        assert_eq!(e.field("Buyer"), Some("Sample Buyer"));
    }
}
