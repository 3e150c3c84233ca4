// SPDX-License-Identifier: MPL-2.0

use crate::config::{APP_DIR, DB_FILE};
use crate::store::StoreError;
use crate::store::schema::SCHEMA;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Handle to the social database
#[derive(Clone)]
pub struct SocialDb {
    conn: Arc<Mutex<Connection>>,
}

impl SocialDb {
    /// Open or create the database at the default location
    /// Path: ~/.local/share/quad/social.db
    pub fn open_default() -> Result<Self, StoreError> {
        let path = Self::default_path()?;
        Self::open(&path)
    }

    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Path(format!("failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests, scratch use)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        // Cascades in the schema depend on this; it is per-connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run schema migrations
    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        // Execute the schema (all CREATE IF NOT EXISTS)
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get XDG data directory for the database
    fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::Path("could not find data directory".to_string()))?;

        Ok(data_dir.join(APP_DIR).join(DB_FILE))
    }

    /// Access connection for operations
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    /// Current UTC timestamp as RFC 3339 text. Fixed-width, so the stored
    /// strings sort chronologically.
    pub fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_applies() {
        let db = SocialDb::open_in_memory().unwrap();
        let conn = db.conn();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('users', 'profiles', 'posts', 'comments', 'likes', 'follows',
                  'saved_posts', 'notifications', 'registration_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 9);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = SocialDb::open_in_memory().unwrap();
        let conn = db.conn();

        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);

        // Insert referencing a missing user must fail
        let result = conn.execute(
            "INSERT INTO posts (author_id, text, created_at, updated_at)
             VALUES (999, 'x', '2026-01-01T00:00:00.000Z', '2026-01-01T00:00:00.000Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_now_is_sortable_rfc3339() {
        let a = SocialDb::now();
        assert!(a.ends_with('Z'));
        assert_eq!(a.len(), "2026-01-01T00:00:00.000Z".len());
    }
}
