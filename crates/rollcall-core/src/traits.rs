//! Collaborator seams. The core pipelines are pure; everything that performs
//! I/O is reached through one of these traits so the gateway can inject real
//! clients and tests can inject recorders.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{OutgoingMessage, ParsedSchedule, Profile};

/// Chat platform messaging.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Answer an inbound event using its one-shot reply token.
    async fn reply(&self, reply_token: &str, messages: Vec<OutgoingMessage>) -> Result<()>;

    /// Send the same messages to many users.
    async fn multicast(&self, user_ids: &[String], messages: Vec<OutgoingMessage>) -> Result<()>;

    /// Look up a user's display profile.
    async fn profile(&self, user_id: &str) -> Result<Profile>;
}

/// The notification list of registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Register a user. Returns `false` if the user was already present.
    async fn add_user(&self, user_id: &str, group_id: Option<&str>, name: &str) -> Result<bool>;

    async fn list_user_ids(&self) -> Result<Vec<String>>;
}

/// Attendance spreadsheet writes.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Write one contiguous row of checkbox values into an A1 range.
    async fn write_row(&self, range: &str, values: &[bool]) -> Result<()>;
}

/// Calendar event creation.
#[async_trait]
pub trait CalendarSink: Send + Sync {
    /// Insert an event; returns the created event's link or id.
    async fn insert_event(&self, event: &ParsedSchedule) -> Result<String>;
}
