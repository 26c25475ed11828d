//! # Rollcall Scheduler
//!
//! Cron evaluation plus a tokio trigger loop that sleeps between firings.
//!
//! ```text
//! CronTrigger "0 20 * * 6" (Asia/Taipei)
//!   └── sleep until next firing → job() → log result → repeat
//! ```

pub mod cron;
pub mod trigger;

pub use cron::CronSchedule;
pub use trigger::{CronTrigger, run_trigger};
