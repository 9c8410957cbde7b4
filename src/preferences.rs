use crate::error::AppError;
use async_trait::async_trait;
use photo_gallery::{KeyValueStore, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Initialize the preferences schema
pub fn init_preferences_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Key-value store backed by a SQLite table
pub struct SqlitePreferences {
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    pub fn new(conn: Connection) -> Result<Self, AppError> {
        init_preferences_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(Connection::open(path)?)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_value(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set_value(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        self.conn().execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }

    /// Closes the underlying connection
    pub fn close(self) -> Result<(), AppError> {
        let conn = self.conn.into_inner().unwrap_or_else(|e| e.into_inner());
        conn.close().map_err(|(_, e)| AppError::Database(e))
    }
}

fn storage_error(e: rusqlite::Error) -> StorageError {
    StorageError::Unavailable(format!("Database error: {}", e))
}

#[async_trait]
impl KeyValueStore for SqlitePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_value(key).map_err(storage_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_value(key, value).map_err(storage_error)
    }
}
