//! SQLite-backed phrase store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::ServiceError;
use crate::ports::phrase_store::{Phrase, PhraseStore, StoreFuture};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS phrases (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    phrase_id TEXT NOT NULL UNIQUE,
    text TEXT NOT NULL,
    image_url TEXT,
    created_at TEXT NOT NULL
);";

const COLUMNS: &str = "phrase_id, text, image_url, created_at";

/// Persistent phrase store in a single `SQLite` file.
pub struct SqlitePhraseStore {
    conn: Mutex<Connection>,
}

impl SqlitePhraseStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema cannot be created.
    pub fn open(path: &Path) -> Result<Self, ServiceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self, ServiceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ServiceError> {
        self.conn
            .lock()
            .map_err(|e| ServiceError::Storage(format!("connection lock poisoned: {e}")))
    }

    fn select_one(conn: &Connection, phrase_id: &str) -> Result<Option<Phrase>, ServiceError> {
        let phrase = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM phrases WHERE phrase_id = ?1"),
                [phrase_id],
                phrase_from_row,
            )
            .optional()?;
        Ok(phrase)
    }

    /// Run a single-row update and read the row back, `None` if no row matched.
    fn update_row(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
        phrase_id: &str,
    ) -> Result<Option<Phrase>, ServiceError> {
        let conn = self.lock()?;
        if conn.execute(sql, params)? == 0 {
            return Ok(None);
        }
        Self::select_one(&conn, phrase_id)
    }
}

fn phrase_from_row(row: &Row<'_>) -> rusqlite::Result<Phrase> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(Phrase {
        phrase_id: row.get(0)?,
        text: row.get(1)?,
        image_url: row.get(2)?,
        created_at,
    })
}

impl PhraseStore for SqlitePhraseStore {
    fn insert(&self, phrase: Phrase) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let conn = self.lock()?;
            conn.execute(
                &format!("INSERT INTO phrases ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
                params![
                    phrase.phrase_id,
                    phrase.text,
                    phrase.image_url,
                    phrase.created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<Phrase>> {
        Box::pin(async move {
            let conn = self.lock()?;
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM phrases ORDER BY seq ASC"))?;
            let phrases = stmt
                .query_map([], phrase_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(phrases)
        })
    }

    fn get(&self, phrase_id: &str) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        Box::pin(async move {
            let conn = self.lock()?;
            Self::select_one(&conn, &phrase_id)
        })
    }

    fn update_text(&self, phrase_id: &str, text: &str) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        let text = text.to_string();
        Box::pin(async move {
            self.update_row(
                "UPDATE phrases SET text = ?1 WHERE phrase_id = ?2",
                params![text, phrase_id],
                &phrase_id,
            )
        })
    }

    fn update_image(
        &self,
        phrase_id: &str,
        image_url: Option<String>,
    ) -> StoreFuture<'_, Option<Phrase>> {
        let phrase_id = phrase_id.to_string();
        Box::pin(async move {
            self.update_row(
                "UPDATE phrases SET image_url = ?1 WHERE phrase_id = ?2",
                params![image_url, phrase_id],
                &phrase_id,
            )
        })
    }
}
