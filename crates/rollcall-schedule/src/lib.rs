//! # Rollcall Schedule
//!
//! Turns a casual scheduling message into a calendar event.
//!
//! ```text
//! "2024/9/10 19:30 查經"
//!   ├── extract   → 2024-09-10, 19:30
//!   ├── sanitize  → "查經"
//!   └── assemble  → 19:30–20:30 Asia/Taipei
//! ```

pub mod assemble;
pub mod extract;
pub mod sanitize;

use chrono::{DateTime, NaiveTime, TimeZone};
use rollcall_core::config::CalendarConfig;
use rollcall_core::error::Result;
use rollcall_core::types::ParsedSchedule;

pub use assemble::EventAssembler;
pub use extract::{ClockTime, Extraction, Meridiem, extract};
pub use sanitize::{UNNAMED_EVENT, sanitize};

/// Messages shorter than this (in characters) are never schedulable.
pub const MIN_SCHEDULE_TEXT_CHARS: usize = 4;

/// The full extraction pipeline bound to one timezone.
#[derive(Debug, Clone)]
pub struct ScheduleParser {
    assembler: EventAssembler,
}

impl ScheduleParser {
    pub fn new(assembler: EventAssembler) -> Self {
        Self { assembler }
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        Ok(Self::new(EventAssembler::from_config(config)?))
    }

    pub fn assembler(&self) -> &EventAssembler {
        &self.assembler
    }

    /// Parse `text` received at `received_at`. `None` means the text has no
    /// usable date and no calendar event should be created.
    pub fn parse<Z: TimeZone>(&self, text: &str, received_at: &DateTime<Z>) -> Option<ParsedSchedule> {
        if text.chars().count() < MIN_SCHEDULE_TEXT_CHARS {
            return None;
        }

        let reference = received_at
            .with_timezone(&self.assembler.timezone())
            .date_naive();
        let found = extract(text, reference)?;
        let title = sanitize(text);

        let result = match found.time {
            Some(time) => {
                let Some(clock) = NaiveTime::from_hms_opt(time.hour24(), time.minute, 0) else {
                    tracing::debug!("Ignoring impossible clock time {time:?} in {text:?}");
                    return None;
                };
                self.assembler
                    .assemble(&title, None, Some(found.date.and_time(clock)), None)
            }
            None => self.assembler.assemble(&title, Some(found.date), None, None),
        };

        match result {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                tracing::warn!("Could not build event from {text:?}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rollcall_core::types::EventWhen;

    fn parser() -> ScheduleParser {
        ScheduleParser::from_config(&CalendarConfig::default()).unwrap()
    }

    fn received() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_timed_message() {
        let event = parser().parse("2024/9/10 19:30 查經", &received()).unwrap();
        assert_eq!(event.title, "查經");
        assert!(!event.is_all_day());
        let EventWhen::Timed { start, end } = event.when else {
            panic!("expected a timed event");
        };
        assert_eq!(start.to_rfc3339(), "2024-09-10T19:30:00+08:00");
        assert_eq!(end.to_rfc3339(), "2024-09-10T20:30:00+08:00");
    }

    #[test]
    fn test_all_day_message() {
        let event = parser().parse("9/10 禮拜", &received()).unwrap();
        assert_eq!(event.title, "禮拜");
        assert_eq!(
            event.when,
            EventWhen::AllDay {
                date: NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
            }
        );
    }

    #[test]
    fn test_afternoon_marker() {
        let event = parser().parse("9/14 下午3點 小排", &received()).unwrap();
        let EventWhen::Timed { start, .. } = event.when else {
            panic!("expected a timed event");
        };
        assert_eq!(start.to_rfc3339(), "2024-09-14T15:00:00+08:00");
        assert_eq!(event.title, "小排");
    }

    #[test]
    fn test_no_date() {
        assert!(parser().parse("查經聚會", &received()).is_none());
    }

    #[test]
    fn test_too_short() {
        assert!(parser().parse("9/1", &received()).is_none());
    }

    #[test]
    fn test_impossible_time() {
        assert!(parser().parse("9/10 25:00 夜禱", &received()).is_none());
    }

    #[test]
    fn test_reference_year_in_local_time() {
        // 2024-12-31T17:00Z is already 2025-01-01 in Taipei
        let new_year = Utc.with_ymd_and_hms(2024, 12, 31, 17, 0, 0).unwrap();
        let event = parser().parse("3/5 特會", &new_year).unwrap();
        assert_eq!(
            event.when,
            EventWhen::AllDay {
                date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
            }
        );
    }

    #[test]
    fn test_half_hour_regression() {
        let event = parser().parse("9/10 晚上7點半查經", &received()).unwrap();
        assert_eq!(event.title, "晚上 半查經");
        let EventWhen::Timed { start, .. } = event.when else {
            panic!("expected a timed event");
        };
        assert_eq!(start.to_rfc3339(), "2024-09-10T07:00:00+08:00");
    }
}
