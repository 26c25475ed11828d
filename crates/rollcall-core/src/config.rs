//! Rollcall configuration system.
//!
//! Loaded from a TOML file (default `~/.rollcall/config.toml`). Every section
//! has defaults, so an empty or missing file yields a runnable configuration.
//! Secrets can be supplied through environment variables, which take
//! precedence over the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, RollcallError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollcallConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub weekly: WeeklyConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Display names allowed to trigger a broadcast from chat.
    #[serde(default)]
    pub admins: Vec<String>,
}

impl RollcallConfig {
    /// Load config from the default path (~/.rollcall/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RollcallError::Config(format!("Failed to read config: {e}")))?;
        tracing::debug!("Loading config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RollcallError::Config(format!("Failed to parse config: {e}")))
    }

    /// Overlay secrets from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay secrets from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = v;
        }
        if let Some(v) = get("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = v;
        }
        if let Some(v) = get("SERVICE_ACC_SECRET") {
            self.google.service_account_json = v;
        }
        if let Some(v) = get("GOOGLE_CALENDAR_ID") {
            self.calendar.calendar_id = v;
        }
        if let Some(v) = get("ROLLCALL_CRON_SECRET") {
            self.gateway.cron_secret = Some(v);
        }
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Rollcall home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rollcall")
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// When set, `/api/weekly` requires `Authorization: Bearer <secret>`.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cron_secret: None,
        }
    }
}

/// LINE Messaging API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub channel_access_token: String,
    #[serde(default)]
    pub channel_secret: String,
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

fn default_line_api_base() -> String { "https://api.line.me".into() }

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            api_base: default_line_api_base(),
        }
    }
}

/// One trackable activity in the weekly checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryConfig {
    /// Single-character event code. Doubles as the spreadsheet column letter.
    pub code: char,
    /// Button label.
    pub name: String,
    /// Label used in the check-in confirmation; falls back to `name`.
    #[serde(default)]
    pub record_name: Option<String>,
}

impl CatalogEntryConfig {
    fn new(code: char, name: &str, record_name: Option<&str>) -> Self {
        Self {
            code,
            name: name.into(),
            record_name: record_name.map(String::from),
        }
    }
}

/// Weekly checklist layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Title shown when a user asks for the checklist.
    #[serde(default = "default_checklist_title")]
    pub title: String,
    /// Title shown on the weekly broadcast.
    #[serde(default = "default_broadcast_title")]
    pub broadcast_title: String,
    /// Display rows, each rendered as one row of toggle buttons. Written as
    /// nested inline arrays: `rows = [[{ code = "C", name = "主日" }], ...]`.
    #[serde(default = "default_catalog_rows")]
    pub rows: Vec<Vec<CatalogEntryConfig>>,
}

fn default_checklist_title() -> String { "週點名".into() }
fn default_broadcast_title() -> String { "嗨～來週點名囉～".into() }

fn default_catalog_rows() -> Vec<Vec<CatalogEntryConfig>> {
    vec![
        vec![
            CatalogEntryConfig::new('C', "主日", Some("主日聚會")),
            CatalogEntryConfig::new('D', "禱告聚會", None),
            CatalogEntryConfig::new('H', "小排", None),
        ],
        vec![
            CatalogEntryConfig::new('E', "晨興", None),
            CatalogEntryConfig::new('F', "家聚會", Some("家出訪")),
            CatalogEntryConfig::new('G', "家受訪", None),
        ],
        vec![
            CatalogEntryConfig::new('J', "生命讀經", None),
            CatalogEntryConfig::new('K', "天天生命讀經", None),
        ],
        vec![
            CatalogEntryConfig::new('I', "傳福音", None),
            CatalogEntryConfig::new('L', "個人禱告", None),
        ],
    ]
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            title: default_checklist_title(),
            broadcast_title: default_broadcast_title(),
            rows: default_catalog_rows(),
        }
    }
}

/// Attendance spreadsheet layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub spreadsheet_key: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    /// Ordered column alphabet; one checkbox column per event code.
    #[serde(default = "default_columns")]
    pub columns: String,
    /// Participant display name → spreadsheet row number.
    #[serde(default)]
    pub roster: BTreeMap<String, u32>,
}

fn default_worksheet() -> String { "attendance".into() }
fn default_columns() -> String { "CDEFGHIJKL".into() }

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_key: String::new(),
            worksheet: default_worksheet(),
            columns: default_columns(),
            roster: BTreeMap::new(),
        }
    }
}

/// Calendar target and event defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Length of a timed event when the message carries no duration.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
}

fn default_calendar_id() -> String { "primary".into() }
fn default_timezone() -> String { "Asia/Taipei".into() }
fn default_duration_minutes() -> i64 { 60 }

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            timezone: default_timezone(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

/// Google service-account credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Full service-account key JSON, inline.
    #[serde(default)]
    pub service_account_json: String,
    #[serde(default = "default_sheets_base")]
    pub sheets_api_base: String,
    #[serde(default = "default_calendar_base")]
    pub calendar_api_base: String,
}

fn default_sheets_base() -> String { "https://sheets.googleapis.com/v4".into() }
fn default_calendar_base() -> String { "https://www.googleapis.com/calendar/v3".into() }

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            service_account_json: String::new(),
            sheets_api_base: default_sheets_base(),
            calendar_api_base: default_calendar_base(),
        }
    }
}

/// In-process weekly broadcast trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 5-field cron expression, evaluated in the calendar timezone.
    #[serde(default = "default_weekly_cron")]
    pub cron: String,
}

fn default_weekly_cron() -> String { "0 20 * * 6".into() }

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron: default_weekly_cron(),
        }
    }
}

/// User table storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String { "~/.rollcall/rollcall.db".into() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}
