//! shopwatch entry point.
//!
//! Thin on purpose: loads and validates configuration, builds the feed and
//! channel clients, starts the poll task, and serves the control plane.
//! All pass logic lives in `pass.rs`; shared state and the scheduler in
//! `state.rs`.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use sw_daemon::{pass::PassRunner, routes, state};
use sw_feed::EtsyReceiptsFeed;
use sw_notify::{DiscordSink, Notifier};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    // Fail fast: a bad environment stops startup, not the first tick.
    let cfg = sw_config::resolve_config_from_env().context("configuration rejected")?;
    info!(config = ?cfg, "configuration loaded");

    let feed = EtsyReceiptsFeed::new(
        cfg.etsy_api_key.clone(),
        cfg.shop_id.clone(),
        cfg.etsy_base_url.clone(),
        cfg.call_timeout,
    )?;
    let sink = DiscordSink::new(
        cfg.discord_token.clone(),
        cfg.channel_id,
        cfg.discord_base_url.clone(),
        cfg.call_timeout,
    )?;
    // Token and channel must be usable before the first pass consumes orders.
    sink.verify()
        .await
        .context("chat credential or destination channel rejected")?;
    info!(channel_id = cfg.channel_id, "chat channel verified");

    let runner = PassRunner::new(
        Arc::new(feed),
        Notifier::new(Arc::new(sink), cfg.call_timeout),
        cfg.page_size,
        cfg.call_timeout,
    );
    let shared = Arc::new(state::AppState::new(runner));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(15));
    let _poll = state::spawn_poll_tick(Arc::clone(&shared), cfg.poll_interval);
    info!(
        interval_secs = cfg.poll_interval.as_secs(),
        page_size = cfg.page_size,
        "order polling started"
    );

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let listener = tokio::net::TcpListener::bind(cfg.daemon_addr)
        .await
        .with_context(|| format!("bind {}", cfg.daemon_addr))?;
    info!("shopwatch listening on http://{}", cfg.daemon_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
