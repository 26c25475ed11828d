//! Inbound LINE webhook: signature check and event parsing.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::types::InboundEvent;
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

/// Check `X-Line-Signature`: base64 HMAC-SHA256 of the raw body, keyed with
/// the channel secret. Comparison is constant-time. An empty secret never
/// verifies.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> Result<()> {
    if channel_secret.is_empty() {
        return Err(RollcallError::Signature("channel secret is not configured".into()));
    }
    if signature.is_empty() {
        return Err(RollcallError::Signature(format!("missing {SIGNATURE_HEADER}")));
    }
    let provided = BASE64
        .decode(signature.trim())
        .map_err(|e| RollcallError::Signature(format!("not base64: {e}")))?;
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| RollcallError::Signature(format!("bad channel secret: {e}")))?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| RollcallError::Signature("digest mismatch".into()))
}

/// Compute the signature LINE would send for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| RollcallError::Signature(format!("bad channel secret: {e}")))?;
    mac.update(body);
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

// --- LINE Webhook Types ---

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<MessageContent>,
    #[serde(default)]
    pub postback: Option<PostbackContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostbackContent {
    pub data: String,
}

impl WebhookBody {
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Events the bot acts on. Everything else (unfollow, stickers, images,
    /// events without a reply token or user) is dropped.
    pub fn inbound_events(&self) -> Vec<InboundEvent> {
        self.events.iter().filter_map(WebhookEvent::to_inbound).collect()
    }
}

impl WebhookEvent {
    pub fn to_inbound(&self) -> Option<InboundEvent> {
        let reply_token = self.reply_token.clone()?;
        let source = self.source.as_ref()?;
        let user_id = source.user_id.clone()?;
        let group_id = source.group_id.clone();

        match self.event_type.as_str() {
            "follow" => Some(InboundEvent::Follow {
                reply_token,
                user_id,
            }),
            "message" => {
                let message = self.message.as_ref()?;
                if message.message_type != "text" {
                    return None;
                }
                Some(InboundEvent::Text {
                    reply_token,
                    user_id,
                    group_id,
                    text: message.text.clone()?,
                    timestamp: self
                        .timestamp
                        .and_then(DateTime::<Utc>::from_timestamp_millis)
                        .unwrap_or_else(Utc::now)
                        .fixed_offset(),
                })
            }
            "postback" => Some(InboundEvent::Postback {
                reply_token,
                user_id,
                group_id,
                data: self.postback.as_ref()?.data.clone(),
            }),
            other => {
                tracing::debug!("[line] ignoring {other} event");
                None
            }
        }
    }
}
