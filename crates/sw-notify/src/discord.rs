//! Chat-platform REST implementation of [`ChannelSink`].
//!
//! Posts to `POST {base}/channels/{channel_id}/messages` with a bot token.
//! [`DiscordSink::verify`] checks the token and channel before polling starts.
//! Connection, gateway session and command dispatch are not handled here.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::{ChannelSink, Embed, NotifyError};

#[derive(Clone)]
pub struct DiscordSink {
    http: reqwest::Client,
    token: String,
    channel_id: u64,
    base_url: String,
}

impl std::fmt::Debug for DiscordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the bot token.
        f.debug_struct("DiscordSink")
            .field("channel_id", &self.channel_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DiscordSink {
    pub fn new(
        token: String,
        channel_id: u64,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build channel http client")?;

        Ok(Self {
            http,
            token,
            channel_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.base_url, self.channel_id)
    }

    fn classify(status: StatusCode) -> Result<(), NotifyError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NotifyError::Unauthorized);
        }
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn get_status(&self, url: String) -> Result<StatusCode, NotifyError> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(resp.status())
    }

    /// Startup check: the token authenticates (`GET /users/@me`) and the
    /// destination channel is visible to it (`GET /channels/{id}`).
    ///
    /// Sends nothing. A failure here must stop startup; once polling runs, a
    /// send failure consumes the order.
    pub async fn verify(&self) -> Result<(), NotifyError> {
        let me = self.get_status(format!("{}/users/@me", self.base_url)).await?;
        Self::classify(me)?;

        let channel = self
            .get_status(format!("{}/channels/{}", self.base_url, self.channel_id))
            .await?;
        Self::classify(channel)?;

        debug!(channel_id = self.channel_id, "channel credential verified");
        Ok(())
    }

    async fn post(&self, body: serde_json::Value) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(self.messages_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Self::classify(resp.status())
    }
}

#[async_trait::async_trait]
impl ChannelSink for DiscordSink {
    async fn send_embed(&self, embed: &Embed) -> Result<(), NotifyError> {
        self.post(json!({ "embeds": [embed] })).await
    }

    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.post(json!({ "content": text })).await
    }
}
