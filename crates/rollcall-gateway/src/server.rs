//! HTTP server implementation using Axum.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::routing::{get, post};
use rollcall_channels::LineChannel;
use rollcall_core::RollcallConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::{CalendarSink, SheetWriter};
use rollcall_core::types::ParsedSchedule;
use rollcall_google::{
    CALENDAR_SCOPE, CalendarClient, SHEETS_SCOPE, ServiceAccountAuth, ServiceAccountKey,
    SheetsClient,
};
use rollcall_scheduler::{CronTrigger, run_trigger};
use tower_http::trace::TraceLayer;

use crate::db::UserDb;
use crate::dispatch::{Collaborators, Dispatcher};

/// Shared state for the gateway server.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub channel_secret: String,
    /// When set, `/api/weekly` requires this bearer token.
    pub cron_secret: Option<String>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::home))
        .route("/webhook", post(super::routes::line_webhook))
        .route("/api/weekly", get(super::routes::weekly))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Stand-in for the Google clients when no service account is configured.
struct GoogleUnavailable;

#[async_trait]
impl SheetWriter for GoogleUnavailable {
    async fn write_row(&self, _range: &str, _values: &[bool]) -> Result<()> {
        Err(RollcallError::Sheet("Google service account is not configured".into()))
    }
}

#[async_trait]
impl CalendarSink for GoogleUnavailable {
    async fn insert_event(&self, _event: &ParsedSchedule) -> Result<String> {
        Err(RollcallError::Calendar("Google service account is not configured".into()))
    }
}

fn database_path(config: &RollcallConfig) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&config.database.path).to_string())
}

/// Wire the production collaborators and build a dispatcher.
pub fn build_dispatcher(config: &RollcallConfig) -> Result<Dispatcher> {
    if config.line.channel_access_token.is_empty() {
        tracing::warn!("[line] channel access token is empty; replies will fail");
    }
    let messenger = Arc::new(LineChannel::new(config.line.clone()));
    let users = Arc::new(UserDb::open(&database_path(config))?);

    let (sheet, calendar): (Arc<dyn SheetWriter>, Arc<dyn CalendarSink>) =
        if config.google.service_account_json.trim().is_empty() {
            tracing::warn!("Google service account not configured; sheet and calendar disabled");
            let sheet: Arc<dyn SheetWriter> = Arc::new(GoogleUnavailable);
            let calendar: Arc<dyn CalendarSink> = Arc::new(GoogleUnavailable);
            (sheet, calendar)
        } else {
            let key = ServiceAccountKey::from_json(&config.google.service_account_json)?;
            let auth = Arc::new(ServiceAccountAuth::new(key, &[SHEETS_SCOPE, CALENDAR_SCOPE])?);
            let sheet: Arc<dyn SheetWriter> = Arc::new(SheetsClient::new(
                auth.clone(),
                &config.google.sheets_api_base,
                &config.sheet.spreadsheet_key,
            ));
            let calendar: Arc<dyn CalendarSink> = Arc::new(CalendarClient::new(
                auth,
                &config.google.calendar_api_base,
                &config.calendar.calendar_id,
            ));
            (sheet, calendar)
        };

    Dispatcher::new(
        config,
        Collaborators {
            messenger,
            users,
            sheet,
            calendar,
        },
    )
}

impl AppState {
    /// Server state for `config`. Refuses an empty channel secret, since every
    /// webhook would then carry a signature anyone can compute.
    pub fn new(config: &RollcallConfig, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        if config.line.channel_secret.trim().is_empty() {
            return Err(RollcallError::Config(
                "line.channel_secret is not set (LINE_CHANNEL_SECRET)".into(),
            ));
        }
        Ok(Self {
            dispatcher,
            channel_secret: config.line.channel_secret.clone(),
            cron_secret: config.gateway.cron_secret.clone(),
        })
    }
}

/// Start the HTTP server and, when enabled, the in-process weekly trigger.
pub async fn start(config: &RollcallConfig) -> anyhow::Result<()> {
    let dispatcher = Arc::new(build_dispatcher(config)?);
    let state = Arc::new(AppState::new(config, dispatcher.clone())?);

    if config.weekly.enabled {
        let trigger = CronTrigger::weekly(&config.weekly, &config.calendar)?;
        let for_trigger = dispatcher.clone();
        tokio::spawn(run_trigger(trigger, move || {
            let dispatcher = for_trigger.clone();
            async move { dispatcher.broadcast_weekly().await.map(|_| ()) }
        }));
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
