//! LINE messaging platform: webhook payload types, signature check, reply client

use crate::error::{BotError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

const LINE_API_BASE: &str = "https://api.line.me";

type HmacSha256 = Hmac<Sha256>;

/// Compute the `X-Line-Signature` value for a raw request body
///
/// HMAC-SHA256 over the exact bytes as delivered, keyed by the channel
/// secret, base64-encoded.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    // HMAC-SHA256 accepts keys of any length
    #[allow(clippy::unwrap_used)]
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a delivered `X-Line-Signature` header against the raw body
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    sign(channel_secret, body) == signature
}

/// Decoded webhook delivery: a batch of events
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event
///
/// Only text-message events carry everything the bot needs; other event
/// kinds (follow, join, sticker messages) deserialize with the unknown
/// parts absent and are skipped by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,

    pub source: Option<EventSource>,

    pub message: Option<MessageContent>,
}

impl WebhookEvent {
    /// The `(user_id, reply_token, text)` triple, present only for a
    /// text-message event from an identified user
    pub fn as_text_message(&self) -> Option<(&str, &str, &str)> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        let text = message.text.as_deref()?;
        let user_id = self.source.as_ref()?.user_id.as_deref()?;
        let reply_token = self.reply_token.as_deref()?;
        Some((user_id, reply_token, text))
    }
}

/// Who the event came from
#[derive(Debug, Clone, Deserialize)]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Message body of a message event
#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub message_type: String,

    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

/// LINE messaging API client
///
/// Only the reply endpoint is used; reply tokens are single-use and
/// short-lived, so each inbound event gets exactly one reply attempt.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: Client,
    channel_access_token: String,
    api_base: String,
}

impl LineClient {
    /// Create a new client with the given channel access token
    pub fn new(channel_access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            channel_access_token: channel_access_token.into(),
            api_base: LINE_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests, proxies)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Send one text message against a reply token
    pub async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.channel_access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::LineApiError(format!("HTTP {status}: {body}")));
        }

        debug!(reply_token, "reply delivered");
        Ok(())
    }
}
