//! Recording sink: keeps every message it was asked to send.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use sw_notify::{ChannelSink, Embed, NotifyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text(String),
    Embed(Embed),
}

/// Records sends. Individual orders (by `Order ID` field value) can be made
/// to fail, and every send can be delayed.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentMessage>>,
    attempts: Mutex<usize>,
    fail_order_ids: Mutex<HashSet<String>>,
    fail_text: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends for this order id return `Rejected { status: 500 }`.
    pub fn fail_order(&self, order_id: &str) {
        self.fail_order_ids
            .lock()
            .unwrap()
            .insert(order_id.to_string());
    }

    /// Plain-text sends return `Transport`.
    pub fn fail_text(&self) {
        *self.fail_text.lock().unwrap() = true;
    }

    pub fn set_delay(&self, d: Duration) {
        *self.delay.lock().unwrap() = Some(d);
    }

    /// Successfully sent messages, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Every send call, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text(t) => Some(t),
                SentMessage::Embed(_) => None,
            })
            .collect()
    }

    /// `Order ID` field of each successfully sent embed, in send order.
    pub fn announced_ids(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Embed(e) => e.field("Order ID").map(str::to_string),
                SentMessage::Text(_) => None,
            })
            .collect()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait::async_trait]
impl ChannelSink for RecordingSink {
    async fn send_embed(&self, embed: &Embed) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;
        self.pause().await;

        let order_id = embed.field("Order ID").unwrap_or_default().to_string();
        if self.fail_order_ids.lock().unwrap().contains(&order_id) {
            return Err(NotifyError::Rejected { status: 500 });
        }
        self.sent
            .lock()
            .unwrap()
            .push(SentMessage::Embed(embed.clone()));
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;
        self.pause().await;

        if *self.fail_text.lock().unwrap() {
            return Err(NotifyError::Transport("scripted text failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push(SentMessage::Text(text.to_string()));
        Ok(())
    }
}
