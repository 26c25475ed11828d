//! Google Calendar event insertion.

use async_trait::async_trait;
use reqwest::Url;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::CalendarSink;
use rollcall_core::types::{EventWhen, ParsedSchedule};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::auth::ServiceAccountAuth;

pub struct CalendarClient {
    auth: Arc<ServiceAccountAuth>,
    api_base: String,
    calendar_id: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    html_link: Option<String>,
}

impl CalendarClient {
    pub fn new(auth: Arc<ServiceAccountAuth>, api_base: &str, calendar_id: &str) -> Self {
        Self {
            auth,
            api_base: api_base.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| RollcallError::Config(format!("Invalid Calendar API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RollcallError::Config("Calendar API base cannot be a base URL".into()))?
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

/// Calendar API event resource for a parsed schedule.
pub fn event_body(event: &ParsedSchedule) -> Value {
    let (start, end) = match &event.when {
        EventWhen::AllDay { date } => {
            let end = event.end_date().unwrap_or(*date);
            (
                json!({"date": date.format("%Y-%m-%d").to_string(), "timeZone": event.timezone}),
                json!({"date": end.format("%Y-%m-%d").to_string(), "timeZone": event.timezone}),
            )
        }
        EventWhen::Timed { start, end } => (
            json!({"dateTime": start.to_rfc3339(), "timeZone": event.timezone}),
            json!({"dateTime": end.to_rfc3339(), "timeZone": event.timezone}),
        ),
    };
    json!({
        "summary": event.title,
        "start": start,
        "end": end,
    })
}

#[async_trait]
impl CalendarSink for CalendarClient {
    async fn insert_event(&self, event: &ParsedSchedule) -> Result<String> {
        let url = self.events_url()?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&event_body(event))
            .timeout(std::time::Duration::from_secs(15))
            .send()
            .await
            .map_err(|e| RollcallError::Calendar(format!("Calendar request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RollcallError::Calendar(format!(
                "Calendar API error {status}: {error_text}"
            )));
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| RollcallError::Calendar(format!("Invalid Calendar response: {e}")))?;
        let link = inserted.html_link.or(inserted.id).unwrap_or_default();
        tracing::info!("[calendar] created \"{}\" {link}", event.title);
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CALENDAR_SCOPE, tests::test_key};
    use chrono::{NaiveDate, TimeZone};

    fn schedule(when: EventWhen) -> ParsedSchedule {
        ParsedSchedule {
            title: "查經".into(),
            timezone: "Asia/Taipei".into(),
            when,
        }
    }

    #[test]
    fn test_all_day_body() {
        let body = event_body(&schedule(EventWhen::AllDay {
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }));
        assert_eq!(body["summary"], "查經");
        assert_eq!(body["start"]["date"], "2024-12-31");
        assert_eq!(body["end"]["date"], "2025-01-01");
        assert_eq!(body["end"]["timeZone"], "Asia/Taipei");
        assert!(body["start"].get("dateTime").is_none());
    }

    #[test]
    fn test_timed_body() {
        let tz = chrono::FixedOffset::east_opt(8 * 3600).unwrap();
        let start = tz.with_ymd_and_hms(2024, 9, 10, 19, 30, 0).unwrap();
        let body = event_body(&schedule(EventWhen::Timed {
            start,
            end: start + chrono::Duration::hours(1),
        }));
        assert_eq!(body["start"]["dateTime"], "2024-09-10T19:30:00+08:00");
        assert_eq!(body["end"]["dateTime"], "2024-09-10T20:30:00+08:00");
        assert_eq!(body["start"]["timeZone"], "Asia/Taipei");
    }

    #[test]
    fn test_events_url_escapes_calendar_id() {
        let (key, _) = test_key();
        let auth = Arc::new(ServiceAccountAuth::new(key, &[CALENDAR_SCOPE]).unwrap());
        let client = CalendarClient::new(
            auth,
            "https://www.googleapis.com/calendar/v3",
            "team/room@group.calendar.google.com",
        );
        assert_eq!(
            client.events_url().unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%2Froom@group.calendar.google.com/events"
        );
    }
}
