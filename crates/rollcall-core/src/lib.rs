//! # Rollcall Core
//! Configuration, errors, shared types and collaborator traits.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::RollcallConfig;
pub use error::{Result, RollcallError};
