//! Database module
//!
//! Persists learner settings as key-value rows in SQLite.

mod schema;

use schema::{API_KEY, MODEL_KEY, SCHEMA};

use crate::settings::{Settings, SettingsStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.lock().execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Settings Operations ====================

    /// Read one setting, `None` if never written
    pub fn get_setting(&self, key: &str) -> DbResult<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write several settings in one transaction
    pub fn put_settings(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let mut conn = self.lock();
        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl SettingsStore for Database {
    fn load(&self) -> DbResult<Settings> {
        let api_key = self.get_setting(API_KEY)?.unwrap_or_default();
        let model = self.get_setting(MODEL_KEY)?.unwrap_or_default();
        Ok(Settings::new(api_key, model))
    }

    fn save(&self, settings: &Settings) -> DbResult<()> {
        self.put_settings(&[
            (API_KEY, settings.api_key.as_str()),
            (MODEL_KEY, settings.model.as_str()),
        ])
    }
}
