//! Runtime configuration for shopwatch.
//!
//! This crate is the **single source of truth** for environment reads.
//!
//! # Contract
//! - Binaries call [`resolve_config_from_env`] once at startup and pass the
//!   returned [`Config`] into constructors. Clients that only talk to a
//!   running daemon call [`resolve_daemon_addr_from_env`]. Nothing else reads
//!   `std::env`.
//! - Every required value is checked up front. A missing or malformed value
//!   fails startup, never the first tick.
//! - Error messages reference the env var **NAME**, never the value.
//! - `Debug` output redacts both credentials.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Env var names
// ---------------------------------------------------------------------------

pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_ETSY_API_KEY: &str = "ETSY_API_KEY";
pub const ENV_ETSY_SHOP_ID: &str = "ETSY_SHOP_ID";
pub const ENV_CHANNEL_ID: &str = "CHANNEL_ID";

pub const ENV_POLL_INTERVAL_SECS: &str = "SW_POLL_INTERVAL_SECS";
pub const ENV_PAGE_SIZE: &str = "SW_PAGE_SIZE";
pub const ENV_CALL_TIMEOUT_SECS: &str = "SW_CALL_TIMEOUT_SECS";
pub const ENV_ETSY_BASE_URL: &str = "SW_ETSY_BASE_URL";
pub const ENV_DISCORD_BASE_URL: &str = "SW_DISCORD_BASE_URL";
pub const ENV_DAEMON_ADDR: &str = "SW_DAEMON_ADDR";

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// The receipts endpoint caps `limit` at 100.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ETSY_BASE_URL: &str = "https://openapi.etsy.com";
pub const DEFAULT_DISCORD_BASE_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_DAEMON_ADDR: &str = "127.0.0.1:8899";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Fully validated runtime configuration.
///
/// Built **once** at startup. **Credentials are redacted in `Debug` output.**
#[derive(Clone)]
pub struct Config {
    /// Chat platform bot token.
    pub discord_token: String,
    /// Marketplace API key, sent as `x-api-key`.
    pub etsy_api_key: String,
    /// Shop whose receipts are polled. Digits only.
    pub shop_id: String,
    /// Destination channel (snowflake).
    pub channel_id: u64,
    pub poll_interval: Duration,
    pub page_size: u32,
    /// Upper bound on every outbound call made during a pass.
    pub call_timeout: Duration,
    pub etsy_base_url: String,
    pub discord_base_url: String,
    pub daemon_addr: SocketAddr,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<REDACTED>")
            .field("etsy_api_key", &"<REDACTED>")
            .field("shop_id", &self.shop_id)
            .field("channel_id", &self.channel_id)
            .field("poll_interval", &self.poll_interval)
            .field("page_size", &self.page_size)
            .field("call_timeout", &self.call_timeout)
            .field("etsy_base_url", &self.etsy_base_url)
            .field("discord_base_url", &self.discord_base_url)
            .field("daemon_addr", &self.daemon_addr)
            .finish()
    }
}

/// Printable view of a [`Config`] with credentials stripped.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub shop_id: String,
    pub channel_id: u64,
    pub poll_interval_secs: u64,
    pub page_size: u32,
    pub call_timeout_secs: u64,
    pub etsy_base_url: String,
    pub discord_base_url: String,
    pub daemon_addr: String,
}

impl Config {
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            shop_id: self.shop_id.clone(),
            channel_id: self.channel_id,
            poll_interval_secs: self.poll_interval.as_secs(),
            page_size: self.page_size,
            call_timeout_secs: self.call_timeout.as_secs(),
            etsy_base_url: self.etsy_base_url.clone(),
            discord_base_url: self.discord_base_url.clone(),
            daemon_addr: self.daemon_addr.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Look up `name`, treating unset and blank the same way.
fn read_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn required<F>(lookup: &F, name: &str, what: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match read_var(lookup, name) {
        Some(v) => Ok(v),
        None => bail!("CONFIG_MISSING: required env var '{name}' ({what}) is not set or empty"),
    }
}

fn optional_u64<F>(lookup: &F, name: &str, default: u64, min: u64, max: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = read_var(lookup, name) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(v) if (min..=max).contains(&v) => Ok(v),
        _ => bail!("CONFIG_INVALID: env var '{name}' must be an integer in {min}..={max}"),
    }
}

fn base_url<F>(lookup: &F, name: &str, default: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let url = read_var(lookup, name).unwrap_or_else(|| default.to_string());
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("CONFIG_INVALID: env var '{name}' must be an http(s) URL");
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn daemon_addr<F>(lookup: &F) -> Result<SocketAddr>
where
    F: Fn(&str) -> Option<String>,
{
    let raw =
        read_var(lookup, ENV_DAEMON_ADDR).unwrap_or_else(|| DEFAULT_DAEMON_ADDR.to_string());
    match raw.parse() {
        Ok(a) => Ok(a),
        Err(_) => bail!("CONFIG_INVALID: env var '{ENV_DAEMON_ADDR}' must be a socket address"),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve and validate configuration through an arbitrary lookup function.
///
/// `lookup` maps an env var name to its value. Production passes
/// `std::env::var`; tests pass a map so they never mutate process env.
///
/// # Errors
/// Returns `Err` naming the first missing (`CONFIG_MISSING`) or malformed
/// (`CONFIG_INVALID`) variable.
pub fn resolve_config<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let discord_token = required(&lookup, ENV_DISCORD_TOKEN, "chat bot token")?;
    let etsy_api_key = required(&lookup, ENV_ETSY_API_KEY, "marketplace api key")?;

    let shop_id = required(&lookup, ENV_ETSY_SHOP_ID, "shop id")?;
    if !shop_id.chars().all(|c| c.is_ascii_digit()) {
        bail!("CONFIG_INVALID: env var '{ENV_ETSY_SHOP_ID}' must contain digits only");
    }

    let channel_raw = required(&lookup, ENV_CHANNEL_ID, "destination channel id")?;
    let channel_id = match channel_raw.parse::<u64>() {
        Ok(v) if v > 0 => v,
        _ => bail!("CONFIG_INVALID: env var '{ENV_CHANNEL_ID}' must be a positive integer"),
    };

    let poll_secs = optional_u64(
        &lookup,
        ENV_POLL_INTERVAL_SECS,
        DEFAULT_POLL_INTERVAL_SECS,
        1,
        u64::from(u32::MAX),
    )?;
    let page_size = optional_u64(
        &lookup,
        ENV_PAGE_SIZE,
        u64::from(DEFAULT_PAGE_SIZE),
        1,
        u64::from(MAX_PAGE_SIZE),
    )? as u32;
    let timeout_secs = optional_u64(
        &lookup,
        ENV_CALL_TIMEOUT_SECS,
        DEFAULT_CALL_TIMEOUT_SECS,
        1,
        3_600,
    )?;

    let etsy_base_url = base_url(&lookup, ENV_ETSY_BASE_URL, DEFAULT_ETSY_BASE_URL)?;
    let discord_base_url = base_url(&lookup, ENV_DISCORD_BASE_URL, DEFAULT_DISCORD_BASE_URL)?;

    let daemon_addr = daemon_addr(&lookup)?;

    Ok(Config {
        discord_token,
        etsy_api_key,
        shop_id,
        channel_id,
        poll_interval: Duration::from_secs(poll_secs),
        page_size,
        call_timeout: Duration::from_secs(timeout_secs),
        etsy_base_url,
        discord_base_url,
        daemon_addr,
    })
}

/// [`resolve_config`] against the process environment.
pub fn resolve_config_from_env() -> Result<Config> {
    resolve_config(|name| std::env::var(name).ok())
}

/// Control-plane address only, for clients of a running daemon.
///
/// Needs no credentials; validated the same way as in [`resolve_config`].
pub fn resolve_daemon_addr<F>(lookup: F) -> Result<SocketAddr>
where
    F: Fn(&str) -> Option<String>,
{
    daemon_addr(&lookup)
}

/// [`resolve_daemon_addr`] against the process environment.
pub fn resolve_daemon_addr_from_env() -> Result<SocketAddr> {
    resolve_daemon_addr(|name| std::env::var(name).ok())
}
