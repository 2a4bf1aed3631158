//! sw-notify
//!
//! Rendering and emission of order notifications to the chat channel.
//!
//! This crate reads and writes no detector state. It turns orders into
//! structured messages and pushes them through a [`ChannelSink`], in the
//! order it is given.

mod discord;
mod embed;
mod notifier;

pub use discord::DiscordSink;
pub use embed::{
    render_order_embed, Embed, EmbedField, MANUAL_CHECK_TEXT, MONITORING_STARTED_TEXT,
    NEW_ORDER_COLOR, NEW_ORDER_TITLE, UNKNOWN_PLACEHOLDER,
};
pub use notifier::{DispatchReport, Notifier};

use std::fmt;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A single send to the channel failed.
///
/// Never fatal to the loop: the failed message is logged and the batch moves
/// on to the next order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The chat platform rejected the bot credential (401 / 403).
    Unauthorized,
    /// Any other non-2xx status (missing channel, rate limit, bad payload).
    Rejected { status: u16 },
    /// Network failure or timeout.
    Transport(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Unauthorized => write!(f, "channel send unauthorized"),
            NotifyError::Rejected { status } => {
                write!(f, "channel send rejected: http status={status}")
            }
            NotifyError::Transport(msg) => write!(f, "channel send transport error: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Destination channel contract.
///
/// The chat client's session lifecycle lives outside this workspace; a sink
/// only needs to post one message per call.
#[async_trait::async_trait]
pub trait ChannelSink: Send + Sync {
    async fn send_embed(&self, embed: &Embed) -> Result<(), NotifyError>;

    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}
