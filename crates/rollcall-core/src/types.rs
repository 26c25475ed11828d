//! Shared domain types passed between the core pipelines and collaborators.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inbound chat event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The user added the bot as a friend.
    Follow { reply_token: String, user_id: String },
    /// A plain text message.
    Text {
        reply_token: String,
        user_id: String,
        group_id: Option<String>,
        text: String,
        timestamp: DateTime<FixedOffset>,
    },
    /// A button press carrying a postback payload.
    Postback {
        reply_token: String,
        user_id: String,
        group_id: Option<String>,
        data: String,
    },
}

impl InboundEvent {
    pub fn user_id(&self) -> &str {
        match self {
            InboundEvent::Follow { user_id, .. }
            | InboundEvent::Text { user_id, .. }
            | InboundEvent::Postback { user_id, .. } => user_id,
        }
    }

    pub fn reply_token(&self) -> &str {
        match self {
            InboundEvent::Follow { reply_token, .. }
            | InboundEvent::Text { reply_token, .. }
            | InboundEvent::Postback { reply_token, .. } => reply_token,
        }
    }
}

/// A message to send back to the chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutgoingMessage {
    Text(String),
    /// Rich interactive message; `contents` is the platform-specific layout.
    Flex {
        alt_text: String,
        contents: serde_json::Value,
    },
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutgoingMessage::Text(text.into())
    }
}

/// Chat platform user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
}

/// When a parsed event happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventWhen {
    /// A whole day; the exclusive end is the following date.
    AllDay { date: NaiveDate },
    /// A timed span with offsets already resolved from the named timezone.
    Timed {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

/// A calendar event extracted from a free-text scheduling message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSchedule {
    pub title: String,
    /// IANA timezone name the event is tagged with.
    pub timezone: String,
    pub when: EventWhen,
}

impl ParsedSchedule {
    pub fn is_all_day(&self) -> bool {
        matches!(self.when, EventWhen::AllDay { .. })
    }

    /// Exclusive end date of an all-day event.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.when {
            EventWhen::AllDay { date } => date.succ_opt(),
            EventWhen::Timed { .. } => None,
        }
    }

    /// Short human summary, e.g. `2024-09-10 19:30 查經`.
    pub fn summary_line(&self) -> String {
        match &self.when {
            EventWhen::AllDay { date } => format!("{} {}", date.format("%Y-%m-%d"), self.title),
            EventWhen::Timed { start, .. } => {
                format!("{} {}", start.format("%Y-%m-%d %H:%M"), self.title)
            }
        }
    }
}
