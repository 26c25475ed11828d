//! LINE Messaging API: outbound client, webhook intake and Flex layouts.

pub mod client;
pub mod flex;
pub mod webhook;

pub use client::LineChannel;
pub use flex::checklist_message;
pub use webhook::{WebhookBody, verify_signature};
