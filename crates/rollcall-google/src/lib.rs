//! Google collaborators: service-account auth, the attendance sheet writer
//! and the calendar sink.

pub mod auth;
pub mod calendar;
pub mod sheets;

pub use auth::{CALENDAR_SCOPE, SHEETS_SCOPE, ServiceAccountAuth, ServiceAccountKey};
pub use calendar::CalendarClient;
pub use sheets::SheetsClient;
