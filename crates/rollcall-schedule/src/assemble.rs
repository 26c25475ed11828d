//! Turning a title plus a date or a start time into a calendar event.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use rollcall_core::config::CalendarConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::types::{EventWhen, ParsedSchedule};

/// Builds [`ParsedSchedule`] values in one named timezone.
#[derive(Debug, Clone)]
pub struct EventAssembler {
    timezone: Tz,
    default_duration: Duration,
}

impl EventAssembler {
    pub fn new(timezone: &str, default_duration: Duration) -> Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| RollcallError::Config(format!("Unknown timezone {timezone:?}: {e}")))?;
        if default_duration <= Duration::zero() {
            return Err(RollcallError::Config(
                "Default event duration must be positive".into(),
            ));
        }
        Ok(Self {
            timezone,
            default_duration,
        })
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        Self::new(
            &config.timezone,
            Duration::minutes(config.default_duration_minutes),
        )
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Exactly one of `date` (all-day) or `start` (timed) must be given. A
    /// timed event without `end` lasts the default duration. Anything else is
    /// a caller bug and is refused.
    pub fn assemble(
        &self,
        title: &str,
        date: Option<NaiveDate>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<ParsedSchedule> {
        let when = match (date, start, end) {
            (Some(date), None, None) => EventWhen::AllDay { date },
            (None, Some(start), end) => {
                let start = self.localize(start)?;
                let end = match end {
                    Some(end) => self.localize(end)?,
                    None => start + self.default_duration,
                };
                if end <= start {
                    return Err(refuse("event end must be after its start"));
                }
                EventWhen::Timed { start, end }
            }
            (None, None, _) => return Err(refuse("neither a date nor a start time was supplied")),
            (Some(_), _, _) => {
                return Err(refuse("an event cannot be both all-day and timed"));
            }
        };

        Ok(ParsedSchedule {
            title: title.to_string(),
            timezone: self.timezone.name().to_string(),
            when,
        })
    }

    fn localize(&self, local: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| {
                RollcallError::Schedule(format!(
                    "{local} does not exist in {}",
                    self.timezone.name()
                ))
            })
    }
}

fn refuse(reason: &str) -> RollcallError {
    tracing::error!("EventAssembler contract violation: {reason}");
    RollcallError::Schedule(reason.to_string())
}
