//! # Rollcall Gateway
//!
//! HTTP surface of the bot: the LINE webhook, the weekly cron endpoint and a
//! health route, plus the user table and the event dispatcher they share.

pub mod db;
pub mod dispatch;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use db::UserDb;
pub use dispatch::{Collaborators, Command, Dispatcher};
pub use server::{AppState, build_dispatcher, build_router, start};
