//! Error types shared by every Rollcall crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RollcallError>;

#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Invalid webhook signature: {0}")]
    Signature(String),

    #[error("Spreadsheet error: {0}")]
    Sheet(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
