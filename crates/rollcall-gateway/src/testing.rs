//! Recording fakes for the dispatcher's collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rollcall_core::RollcallConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::{CalendarSink, Messenger, SheetWriter, UserDirectory};
use rollcall_core::types::{OutgoingMessage, ParsedSchedule, Profile};

use crate::dispatch::{Collaborators, Dispatcher};

type Sent = (String, Vec<OutgoingMessage>);

#[derive(Default)]
pub struct FakeMessenger {
    display_name: String,
    fail_profiles: Mutex<bool>,
    replies: Mutex<Vec<Sent>>,
    multicasts: Mutex<Vec<(Vec<String>, Vec<OutgoingMessage>)>>,
}

impl FakeMessenger {
    pub fn replies(&self) -> Vec<Sent> {
        self.replies.lock().unwrap().clone()
    }

    pub fn last_reply(&self) -> Vec<OutgoingMessage> {
        self.replies().pop().expect("no reply sent").1
    }

    pub fn multicasts(&self) -> Vec<(Vec<String>, Vec<OutgoingMessage>)> {
        self.multicasts.lock().unwrap().clone()
    }

    pub fn fail_profiles(&self) {
        *self.fail_profiles.lock().unwrap() = true;
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn reply(&self, reply_token: &str, messages: Vec<OutgoingMessage>) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages));
        Ok(())
    }

    async fn multicast(&self, user_ids: &[String], messages: Vec<OutgoingMessage>) -> Result<()> {
        self.multicasts
            .lock()
            .unwrap()
            .push((user_ids.to_vec(), messages));
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Profile> {
        if *self.fail_profiles.lock().unwrap() {
            return Err(RollcallError::Channel("profile lookup failed".into()));
        }
        Ok(Profile {
            user_id: user_id.to_string(),
            display_name: self.display_name.clone(),
        })
    }
}

#[derive(Default)]
pub struct FakeUsers {
    ids: Mutex<Vec<String>>,
}

impl FakeUsers {
    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }

    pub fn seed(&self, user_id: &str) {
        self.ids.lock().unwrap().push(user_id.to_string());
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn add_user(&self, user_id: &str, _group_id: Option<&str>, _name: &str) -> Result<bool> {
        let mut ids = self.ids.lock().unwrap();
        if ids.iter().any(|id| id == user_id) {
            return Ok(false);
        }
        ids.push(user_id.to_string());
        Ok(true)
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        Ok(self.ids())
    }
}

#[derive(Default)]
pub struct FakeSheet {
    fail: Mutex<bool>,
    writes: Mutex<Vec<(String, Vec<bool>)>>,
}

impl FakeSheet {
    pub fn writes(&self) -> Vec<(String, Vec<bool>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl SheetWriter for FakeSheet {
    async fn write_row(&self, range: &str, values: &[bool]) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(RollcallError::Sheet("sheet offline".into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((range.to_string(), values.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    fail: Mutex<bool>,
    events: Mutex<Vec<ParsedSchedule>>,
}

impl FakeCalendar {
    pub fn events(&self) -> Vec<ParsedSchedule> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl CalendarSink for FakeCalendar {
    async fn insert_event(&self, event: &ParsedSchedule) -> Result<String> {
        if *self.fail.lock().unwrap() {
            return Err(RollcallError::Calendar("calendar offline".into()));
        }
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(format!("https://calendar.example/event/{}", events.len()))
    }
}

/// A dispatcher wired to fakes. The sender's display name is mapped to row 5.
pub struct Harness {
    pub messenger: Arc<FakeMessenger>,
    pub users: Arc<FakeUsers>,
    pub sheet: Arc<FakeSheet>,
    pub calendar: Arc<FakeCalendar>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build("daniel", &[])
    }

    pub fn with_name(name: &str) -> Self {
        Self::build(name, &[])
    }

    pub fn with_admin(admin: &str) -> Self {
        Self::build(admin, &[admin])
    }

    fn build(display_name: &str, admins: &[&str]) -> Self {
        let mut config = RollcallConfig::default();
        config.sheet.roster.insert("daniel".into(), 5);
        config.admins = admins.iter().map(|a| a.to_string()).collect();

        let messenger = Arc::new(FakeMessenger {
            display_name: display_name.to_string(),
            ..FakeMessenger::default()
        });
        let users = Arc::new(FakeUsers::default());
        let sheet = Arc::new(FakeSheet::default());
        let calendar = Arc::new(FakeCalendar::default());
        let dispatcher = Dispatcher::new(
            &config,
            Collaborators {
                messenger: messenger.clone(),
                users: users.clone(),
                sheet: sheet.clone(),
                calendar: calendar.clone(),
            },
        )
        .unwrap();

        Self {
            messenger,
            users,
            sheet,
            calendar,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// The text of a single-text-message reply.
pub fn text_of(messages: &[OutgoingMessage]) -> String {
    match messages {
        [OutgoingMessage::Text(text)] => text.clone(),
        other => panic!("expected one text message, got {other:?}"),
    }
}
