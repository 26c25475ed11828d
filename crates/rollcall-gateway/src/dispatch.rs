//! Inbound event dispatch: command routing, checklist postbacks, follow
//! handling and the weekly broadcast.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rollcall_channels::line::checklist_message;
use rollcall_checklist::{ChecklistAction, EventCatalog, SheetLayout, render};
use rollcall_core::RollcallConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::{CalendarSink, Messenger, SheetWriter, UserDirectory};
use rollcall_core::types::{InboundEvent, OutgoingMessage};
use rollcall_schedule::ScheduleParser;

pub const WELCOME_TEXT: &str = "歡迎加入博愛區的點名！\n輸入 點名 就可以開始這週的點名囉！";
pub const PLAN_HELP_TEXT: &str = "看不出這則行程的日期喔！請用以下格式：\n\
plan 2024/9/10 19:30 查經\n\
plan 9/14 下午3點 小排\n\
plan 9月20日 特會";
pub const NOT_ADMIN_TEXT: &str = "只有管理員可以發送週點名通知。";

/// Text commands, matched against the first word of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `點名`: start a fresh checklist.
    Checklist,
    /// `通知我`: join the weekly notification list.
    Subscribe,
    /// `通知`: admin-only weekly broadcast.
    Broadcast,
    /// `plan` / `行程` / `排程`: create a calendar event from the rest of the text.
    Plan,
}

impl Command {
    pub fn lookup(word: &str) -> Option<Self> {
        match word {
            "點名" => Some(Command::Checklist),
            "通知我" => Some(Command::Subscribe),
            "通知" => Some(Command::Broadcast),
            "plan" | "行程" | "排程" => Some(Command::Plan),
            _ => None,
        }
    }
}

/// Split a message into its command word and the remaining text.
pub fn split_command(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

/// The I/O handles the dispatcher talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub messenger: Arc<dyn Messenger>,
    pub users: Arc<dyn UserDirectory>,
    pub sheet: Arc<dyn SheetWriter>,
    pub calendar: Arc<dyn CalendarSink>,
}

pub struct Dispatcher {
    io: Collaborators,
    catalog: EventCatalog,
    layout: SheetLayout,
    parser: ScheduleParser,
    title: String,
    broadcast_title: String,
    admins: Vec<String>,
}

impl Dispatcher {
    pub fn new(config: &RollcallConfig, io: Collaborators) -> Result<Self> {
        let catalog = EventCatalog::from_config(&config.checklist)?;
        let layout = SheetLayout::from_config(&config.sheet)?;
        if let Some(entry) = catalog.entries().find(|e| !layout.has_column(e.code)) {
            return Err(RollcallError::Config(format!(
                "Event code {:?} ({}) has no column in sheet.columns {:?}",
                entry.code, entry.name, config.sheet.columns
            )));
        }
        Ok(Self {
            io,
            catalog,
            layout,
            parser: ScheduleParser::from_config(&config.calendar)?,
            title: config.checklist.title.clone(),
            broadcast_title: config.checklist.broadcast_title.clone(),
            admins: config.admins.clone(),
        })
    }

    fn checklist(&self, title: &str, token: &str) -> OutgoingMessage {
        checklist_message(&render(title, &self.catalog, token))
    }

    async fn reply_text(&self, reply_token: &str, text: impl Into<String>) -> Result<()> {
        self.io
            .messenger
            .reply(reply_token, vec![OutgoingMessage::text(text)])
            .await
    }

    pub async fn handle(&self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::Follow {
                reply_token,
                user_id,
            } => self.on_follow(&reply_token, &user_id).await,
            InboundEvent::Text {
                reply_token,
                user_id,
                group_id,
                text,
                timestamp,
            } => {
                self.on_text(&reply_token, &user_id, group_id.as_deref(), &text, &timestamp)
                    .await
            }
            InboundEvent::Postback {
                reply_token,
                user_id,
                data,
                ..
            } => self.on_postback(&reply_token, &user_id, &data).await,
        }
    }

    /// Dispatch every event; failures are logged per event.
    pub async fn handle_all(&self, events: Vec<InboundEvent>) {
        for event in events {
            let user_id = event.user_id().to_string();
            if let Err(e) = self.handle(event).await {
                tracing::error!("[line] handling event from {user_id} failed: {e}");
            }
        }
    }

    /// The sender's display name. On lookup failure the user gets an
    /// apology and `None` comes back.
    async fn display_name(&self, reply_token: &str, user_id: &str) -> Result<Option<String>> {
        match self.io.messenger.profile(user_id).await {
            Ok(profile) => Ok(Some(profile.display_name)),
            Err(e) => {
                tracing::error!("[line] profile lookup for {user_id} failed: {e}");
                self.reply_text(reply_token, format!("抱歉，無法取得使用者資料：{e}"))
                    .await?;
                Ok(None)
            }
        }
    }

    async fn on_follow(&self, reply_token: &str, user_id: &str) -> Result<()> {
        let Some(name) = self.display_name(reply_token, user_id).await? else {
            return Ok(());
        };
        if let Err(e) = self.io.users.add_user(user_id, None, &name).await {
            tracing::warn!("[line] could not register follower {user_id}: {e}");
        }
        self.reply_text(reply_token, WELCOME_TEXT).await
    }

    async fn on_text(
        &self,
        reply_token: &str,
        user_id: &str,
        group_id: Option<&str>,
        text: &str,
        received_at: &DateTime<FixedOffset>,
    ) -> Result<()> {
        let (word, rest) = split_command(text);
        let Some(command) = Command::lookup(word) else {
            return self.reply_text(reply_token, WELCOME_TEXT).await;
        };
        tracing::debug!("[line] {user_id} → {command:?}");

        match command {
            Command::Checklist => {
                self.io
                    .messenger
                    .reply(reply_token, vec![self.checklist(&self.title, "")])
                    .await
            }
            Command::Subscribe => {
                let Some(name) = self.display_name(reply_token, user_id).await? else {
                    return Ok(());
                };
                match self.io.users.add_user(user_id, group_id, &name).await {
                    Ok(_) => self.reply_text(reply_token, format!("{name} 已加入通知清單！")).await,
                    Err(e) => {
                        tracing::error!("[line] subscribe failed for {user_id}: {e}");
                        self.reply_text(reply_token, format!("抱歉，加入通知清單時發生錯誤：{e}"))
                            .await
                    }
                }
            }
            Command::Broadcast => {
                let Some(name) = self.display_name(reply_token, user_id).await? else {
                    return Ok(());
                };
                if !self.admins.iter().any(|admin| admin == &name) {
                    tracing::warn!("[weekly] broadcast refused for non-admin {name}");
                    return self.reply_text(reply_token, NOT_ADMIN_TEXT).await;
                }
                match self.broadcast_weekly().await {
                    Ok(count) => {
                        self.reply_text(reply_token, format!("已發送週點名通知給 {count} 位使用者。"))
                            .await
                    }
                    Err(e) => {
                        self.reply_text(reply_token, format!("抱歉，發送通知時發生錯誤：{e}"))
                            .await
                    }
                }
            }
            Command::Plan => self.on_plan(reply_token, rest, received_at).await,
        }
    }

    async fn on_plan(
        &self,
        reply_token: &str,
        text: &str,
        received_at: &DateTime<FixedOffset>,
    ) -> Result<()> {
        let Some(schedule) = self.parser.parse(text, received_at) else {
            return self.reply_text(reply_token, PLAN_HELP_TEXT).await;
        };

        match self.io.calendar.insert_event(&schedule).await {
            Ok(link) => {
                let mut reply = format!("已新增行程：{}", schedule.summary_line());
                if !link.is_empty() {
                    reply.push('\n');
                    reply.push_str(&link);
                }
                self.reply_text(reply_token, reply).await
            }
            Err(e) => {
                tracing::error!("[calendar] insert failed for {:?}: {e}", schedule.title);
                self.reply_text(reply_token, format!("抱歉，建立行程時發生錯誤：{e}"))
                    .await
            }
        }
    }

    async fn on_postback(&self, reply_token: &str, user_id: &str, data: &str) -> Result<()> {
        let Some(action) = ChecklistAction::parse(data) else {
            tracing::debug!("[line] ignoring postback {data:?}");
            return Ok(());
        };

        match action {
            ChecklistAction::Next { token } => {
                self.io
                    .messenger
                    .reply(reply_token, vec![self.checklist(&self.title, &token)])
                    .await
            }
            ChecklistAction::Submit { token } => self.on_submit(reply_token, user_id, &token).await,
        }
    }

    async fn on_submit(&self, reply_token: &str, user_id: &str, token: &str) -> Result<()> {
        let token = self.catalog.normalize(token);
        let Some(name) = self.display_name(reply_token, user_id).await? else {
            return Ok(());
        };

        let unmapped = match self.layout.row_write(&name, &token) {
            Some(write) => {
                if let Err(e) = self.io.sheet.write_row(&write.range, &write.values).await {
                    tracing::error!("[sheet] write for {name} failed: {e}");
                    return self
                        .reply_text(reply_token, format!("抱歉，寫入點名表時發生錯誤：{e}"))
                        .await;
                }
                false
            }
            None => {
                tracing::warn!("[sheet] {name} has no row in the roster");
                true
            }
        };

        let events = self
            .catalog
            .checked(&token)
            .iter()
            .map(|e| e.record_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut reply = format!("{name} 於 {events} 簽到了～");
        if unmapped {
            reply.push_str(&format!("\n（{name} 尚未對應到點名表，這次紀錄沒有寫入，請聯絡管理員）"));
        }
        self.reply_text(reply_token, reply).await
    }

    /// Multicast the weekly checklist to every registered user. Returns the
    /// number of recipients.
    pub async fn broadcast_weekly(&self) -> Result<usize> {
        let user_ids = self.io.users.list_user_ids().await?;
        self.io
            .messenger
            .multicast(&user_ids, vec![self.checklist(&self.broadcast_title, "")])
            .await?;
        tracing::info!("[weekly] checklist sent to {} user(s)", user_ids.len());
        Ok(user_ids.len())
    }
}
