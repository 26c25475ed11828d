//! # Rollcall Channels
//! Chat platform integration. LINE is the only platform the bot speaks.

pub mod line;

pub use line::LineChannel;
