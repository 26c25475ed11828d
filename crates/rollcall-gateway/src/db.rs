//! User table: the notification list for weekly broadcasts.

use async_trait::async_trait;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::UserDirectory;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed user table.
pub struct UserDb {
    conn: Mutex<Connection>,
}

impl UserDb {
    /// Open or create the database. `:memory:` gives a private in-memory table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && path != Path::new(":memory:") {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| RollcallError::Database(format!("User DB open error: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RollcallError::Database(format!("Lock: {e}")))
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                group_id TEXT,
                name TEXT NOT NULL DEFAULT '',
                created_at TEXT DEFAULT (datetime('now'))
            );
            ",
        )
        .map_err(|e| RollcallError::Database(format!("Migration error: {e}")))
    }

    /// Insert the user unless the id is already present.
    pub fn insert_user(&self, user_id: &str, group_id: Option<&str>, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO users (user_id, group_id, name) VALUES (?1, ?2, ?3)",
                params![user_id, group_id, name],
            )
            .map_err(|e| RollcallError::Database(format!("Insert user: {e}")))?;
        if inserted > 0 {
            tracing::info!("Added user_id: {user_id}, name: {name}");
        } else {
            tracing::debug!("User {user_id} exists, skipping");
        }
        Ok(inserted > 0)
    }

    pub fn user_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT user_id FROM users ORDER BY created_at, user_id")
            .map_err(|e| RollcallError::Database(format!("Prepare: {e}")))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| RollcallError::Database(format!("Query: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| RollcallError::Database(format!("Row: {e}")))?;
        Ok(ids)
    }
}

#[async_trait]
impl UserDirectory for UserDb {
    async fn add_user(&self, user_id: &str, group_id: Option<&str>, name: &str) -> Result<bool> {
        self.insert_user(user_id, group_id, name)
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        self.user_ids()
    }
}
