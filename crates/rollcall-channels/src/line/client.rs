//! Outbound LINE Messaging API calls.

use async_trait::async_trait;
use rollcall_core::config::LineConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::Messenger;
use rollcall_core::types::{OutgoingMessage, Profile};
use serde::Deserialize;

/// LINE caps multicast recipients per request.
pub const MULTICAST_LIMIT: usize = 500;

/// LINE Messaging API client.
pub struct LineChannel {
    config: LineConfig,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(config: LineConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.api_url(path))
            .header(
                "Authorization",
                format!("Bearer {}", self.config.channel_access_token),
            )
            .json(&body)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RollcallError::Channel(format!("LINE {path} request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RollcallError::Channel(format!(
                "LINE {path} error {status}: {error_text}"
            )));
        }
        Ok(())
    }

    /// Reply with a one-shot reply token.
    pub async fn reply_message(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<()> {
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": messages.iter().map(to_line_message).collect::<Vec<_>>(),
        });
        self.post("message/reply", body).await?;
        tracing::debug!("[line] replied with {} message(s)", messages.len());
        Ok(())
    }

    /// Push to many users, split into API-sized batches.
    pub async fn multicast_message(&self, user_ids: &[String], messages: &[OutgoingMessage]) -> Result<()> {
        if user_ids.is_empty() {
            tracing::info!("[line] multicast skipped: no recipients");
            return Ok(());
        }
        let payload: Vec<serde_json::Value> = messages.iter().map(to_line_message).collect();
        for batch in user_ids.chunks(MULTICAST_LIMIT) {
            let body = serde_json::json!({
                "to": batch,
                "messages": &payload,
            });
            self.post("message/multicast", body).await?;
        }
        tracing::info!("[line] multicast sent to {} user(s)", user_ids.len());
        Ok(())
    }

    /// Fetch a user's display profile.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let response = self
            .client
            .get(self.api_url(&format!("profile/{user_id}")))
            .header(
                "Authorization",
                format!("Bearer {}", self.config.channel_access_token),
            )
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RollcallError::Channel(format!("LINE profile request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RollcallError::Channel(format!(
                "LINE profile error {status}: {error_text}"
            )));
        }

        let profile: LineProfile = response
            .json()
            .await
            .map_err(|e| RollcallError::Channel(format!("Invalid LINE profile response: {e}")))?;
        Ok(Profile {
            user_id: profile.user_id,
            display_name: profile.display_name,
        })
    }
}

#[async_trait]
impl Messenger for LineChannel {
    async fn reply(&self, reply_token: &str, messages: Vec<OutgoingMessage>) -> Result<()> {
        self.reply_message(reply_token, &messages).await
    }

    async fn multicast(&self, user_ids: &[String], messages: Vec<OutgoingMessage>) -> Result<()> {
        self.multicast_message(user_ids, &messages).await
    }

    async fn profile(&self, user_id: &str) -> Result<Profile> {
        self.get_profile(user_id).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineProfile {
    user_id: String,
    display_name: String,
}

/// Convert to the LINE message object shape.
pub fn to_line_message(message: &OutgoingMessage) -> serde_json::Value {
    match message {
        OutgoingMessage::Text(text) => serde_json::json!({
            "type": "text",
            "text": text,
        }),
        OutgoingMessage::Flex { alt_text, contents } => serde_json::json!({
            "type": "flex",
            "altText": alt_text,
            "contents": contents,
        }),
    }
}
