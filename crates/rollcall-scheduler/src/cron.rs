//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Field syntax: *, */N, N, A-B, A-B/N and comma lists of those.
//! Example: "0 20 * * 6" = every Saturday at 20:00
//!
//! Day of week is 0-7 with both 0 and 7 meaning Sunday. When both day of
//! month and day of week are restricted, a day matching either one fires.

use chrono::{DateTime, Datelike, Days, NaiveDateTime, NaiveTime, TimeZone};
use rollcall_core::error::{Result, RollcallError};

/// How far ahead `next_after` looks before giving up.
const SEARCH_DAYS: u64 = 366 * 4;

/// A parsed 5-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(RollcallError::Schedule(format!(
                "Invalid cron expression: '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
            )));
        }

        let field = |index: usize, name: &str, min: u32, max: u32| {
            parse_field(parts[index], min, max).ok_or_else(|| {
                RollcallError::Schedule(format!(
                    "Invalid {name} field '{}' in cron expression '{expression}'",
                    parts[index]
                ))
            })
        };

        let mut days_of_week = field(4, "day-of-week", 0, 7)?;
        for day in days_of_week.iter_mut() {
            if *day == 7 {
                *day = 0;
            }
        }
        days_of_week.sort_unstable();
        days_of_week.dedup();

        Ok(Self {
            expression: expression.to_string(),
            minutes: field(0, "minute", 0, 59)?,
            hours: field(1, "hour", 0, 23)?,
            days_of_month: field(2, "day-of-month", 1, 31)?,
            months: field(3, "month", 1, 12)?,
            days_of_week,
            dom_restricted: parts[2] != "*",
            dow_restricted: parts[4] != "*",
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn matches_day(&self, date: chrono::NaiveDate) -> bool {
        if !self.months.contains(&date.month()) {
            return false;
        }
        let dom = self.days_of_month.contains(&date.day());
        let dow = self
            .days_of_week
            .contains(&date.weekday().num_days_from_sunday());
        match (self.dom_restricted, self.dow_restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }

    /// The first firing strictly after `after`, in `after`'s timezone.
    /// Local times skipped by a DST gap never fire.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let local: NaiveDateTime = after.naive_local();

        for offset in 0..=SEARCH_DAYS {
            let date = local.date().checked_add_days(Days::new(offset))?;
            if !self.matches_day(date) {
                continue;
            }
            for &hour in &self.hours {
                for &minute in &self.minutes {
                    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
                        continue;
                    };
                    let candidate = date.and_time(time);
                    if candidate <= local {
                        continue;
                    }
                    if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
                        if resolved > *after {
                            return Some(resolved);
                        }
                    }
                }
            }
        }

        tracing::warn!("Cron expression '{}' never fires", self.expression);
        None
    }
}

/// Parse a cron field into the sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    let mut values = Vec::new();
    for part in field.split(',') {
        values.extend(parse_part(part.trim(), min, max)?);
    }
    values.sort_unstable();
    values.dedup();
    if values.is_empty() { None } else { Some(values) }
}

fn parse_part(part: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    let (range, step) = match part.split_once('/') {
        Some((range, step)) => {
            let n: u32 = step.parse().ok()?;
            if n == 0 {
                return None;
            }
            (range, n)
        }
        None => (part, 1),
    };

    let (start, end) = if range == "*" {
        (min, max)
    } else if let Some((a, b)) = range.split_once('-') {
        (a.parse().ok()?, b.parse().ok()?)
    } else {
        let n: u32 = range.parse().ok()?;
        // "N/S" means N through max every S
        if step > 1 { (n, max) } else { (n, n) }
    };

    if start < min || end > max || start > end {
        return None;
    }
    Some((start..=end).step_by(step as usize).collect())
}
