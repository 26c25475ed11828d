//! In-process cron trigger: sleeps until the next firing and runs a job.

use std::future::Future;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rollcall_core::config::{CalendarConfig, WeeklyConfig};
use rollcall_core::error::{Result, RollcallError};

use crate::cron::CronSchedule;

/// A named cron schedule evaluated in one timezone.
#[derive(Debug, Clone)]
pub struct CronTrigger {
    name: String,
    schedule: CronSchedule,
    timezone: Tz,
}

impl CronTrigger {
    pub fn new(name: &str, expression: &str, timezone: &str) -> Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| RollcallError::Config(format!("Unknown timezone '{timezone}'")))?;
        Ok(Self {
            name: name.to_string(),
            schedule: CronSchedule::parse(expression)?,
            timezone,
        })
    }

    /// The weekly broadcast trigger, evaluated in the calendar timezone.
    pub fn weekly(weekly: &WeeklyConfig, calendar: &CalendarConfig) -> Result<Self> {
        Self::new("weekly", &weekly.cron, &calendar.timezone)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn next_run(&self, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.next_after(&after.with_timezone(&self.timezone))
    }

    /// The run after both `now` and the last firing. A wake-up that lands a
    /// little before the scheduled instant must not yield that instant again.
    pub fn next_run_since(
        &self,
        now: DateTime<Utc>,
        last_fired: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Tz>> {
        let after = match last_fired {
            Some(last) if last > now => last,
            _ => now,
        };
        self.next_run(after)
    }
}

/// Run `job` at every firing of `trigger`, forever. Job failures are logged
/// and do not stop the loop.
pub async fn run_trigger<F, Fut>(trigger: CronTrigger, job: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send,
{
    tracing::info!(
        "[{}] trigger started ({} {})",
        trigger.name,
        trigger.schedule.expression(),
        trigger.timezone
    );

    let mut last_fired: Option<DateTime<Utc>> = None;
    loop {
        let now = Utc::now();
        let Some(next) = trigger.next_run_since(now, last_fired) else {
            tracing::warn!("[{}] no upcoming run, trigger stopped", trigger.name);
            return;
        };
        let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
        tracing::debug!("[{}] next run at {}", trigger.name, next.to_rfc3339());
        tokio::time::sleep(wait).await;
        last_fired = Some(next.with_timezone(&Utc));

        tracing::info!("[{}] firing", trigger.name);
        match job().await {
            Ok(()) => tracing::info!("[{}] completed", trigger.name),
            Err(e) => tracing::warn!("[{}] failed: {e}", trigger.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weekly_from_config() {
        let trigger =
            CronTrigger::weekly(&WeeklyConfig::default(), &CalendarConfig::default()).unwrap();
        assert_eq!(trigger.name(), "weekly");
        // Saturday 2024-09-14 11:59 UTC is 19:59 in Taipei
        let after = Utc.with_ymd_and_hms(2024, 9, 14, 11, 59, 0).unwrap();
        let next = trigger.next_run(after).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-09-14T20:00:00+08:00");
    }

    #[test]
    fn test_early_wakeup_does_not_repeat_firing() {
        let trigger =
            CronTrigger::weekly(&WeeklyConfig::default(), &CalendarConfig::default()).unwrap();
        let fired = Utc.with_ymd_and_hms(2024, 9, 14, 12, 0, 0).unwrap();
        // clock reads 100ms before the firing it just ran
        let now = fired - chrono::Duration::milliseconds(100);

        assert_eq!(trigger.next_run(now).unwrap().with_timezone(&Utc), fired);
        let next = trigger.next_run_since(now, Some(fired)).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-09-21T20:00:00+08:00");

        let later = Utc.with_ymd_and_hms(2024, 9, 30, 0, 0, 0).unwrap();
        let next = trigger.next_run_since(later, Some(fired)).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-10-05T20:00:00+08:00");
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(CronTrigger::new("weekly", "0 20 * * 6", "Mars/Olympus").is_err());
        assert!(CronTrigger::new("weekly", "0 20 * *", "Asia/Taipei").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_trigger_fires_job() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let trigger = CronTrigger::new("every-minute", "* * * * *", "UTC").unwrap();
        let handle = tokio::spawn(run_trigger(trigger, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RollcallError::Other("boom".into()))
            }
        }));

        tokio::time::sleep(std::time::Duration::from_secs(125)).await;
        handle.abort();
        assert!(runs.load(Ordering::SeqCst) >= 1);
    }
}
