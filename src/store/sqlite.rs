//! SQLite-based session store implementation.

use super::SessionStore;
use crate::error::{Result, VoxnoteError};
use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    owner TEXT,
    transcript TEXT NOT NULL DEFAULT '',
    transcription_calls INTEGER NOT NULL DEFAULT 0,
    accumulated_bytes INTEGER NOT NULL DEFAULT 0,
    summary TEXT,
    summary_type TEXT,
    summary_language TEXT,
    translation TEXT,
    translation_language TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_owner ON sessions(owner);
CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON sessions(created_at);
"#;

const SELECT_COLUMNS: &str = r#"
SELECT id, owner, transcript, transcription_calls, accumulated_bytes,
       summary, summary_type, summary_language, translation, translation_language,
       created_at, updated_at
FROM sessions
"#;

/// SQLite-based session store.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open (or create) a session database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets readers proceed while an upload is being written
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite session store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite session store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VoxnoteError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn format_time(time: &DateTime<Utc>) -> String {
        time.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
        let id_str: String = row.get(0)?;
        let calls: i64 = row.get(3)?;
        let bytes: i64 = row.get(4)?;
        let created_at: String = row.get(10)?;
        let updated_at: String = row.get(11)?;

        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Session {
            id,
            owner: row.get(1)?,
            transcript: row.get(2)?,
            transcription_calls: calls.max(0) as u64,
            accumulated_bytes: bytes.max(0) as u64,
            summary: row.get(5)?,
            summary_type: row.get(6)?,
            summary_language: row.get(7)?,
            translation: row.get(8)?,
            translation_language: row.get(9)?,
            created_at: Self::parse_time(&created_at),
            updated_at: Self::parse_time(&updated_at),
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create(&self, session: &Session) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO sessions
            (id, owner, transcript, transcription_calls, accumulated_bytes,
             summary, summary_type, summary_language, translation, translation_language,
             created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                session.id.to_string(),
                session.owner,
                session.transcript,
                session.transcription_calls as i64,
                session.accumulated_bytes as i64,
                session.summary,
                session.summary_type,
                session.summary_language,
                session.translation,
                session.translation_language,
                Self::format_time(&session.created_at),
                Self::format_time(&session.updated_at),
            ],
        )?;

        debug!("Created session");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &Uuid) -> Result<Option<Session>> {
        let conn = self.lock()?;

        let session = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.to_string()],
                Self::row_to_session,
            )
            .optional()?;

        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn update(&self, session: &Session) -> Result<()> {
        let conn = self.lock()?;

        let updated = conn.execute(
            r#"
            UPDATE sessions SET
                owner = ?2,
                transcript = ?3,
                transcription_calls = ?4,
                accumulated_bytes = ?5,
                summary = ?6,
                summary_type = ?7,
                summary_language = ?8,
                translation = ?9,
                translation_language = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                session.id.to_string(),
                session.owner,
                session.transcript,
                session.transcription_calls as i64,
                session.accumulated_bytes as i64,
                session.summary,
                session.summary_type,
                session.summary_language,
                session.translation,
                session.translation_language,
                Self::format_time(&session.updated_at),
            ],
        )?;

        if updated == 0 {
            return Err(VoxnoteError::InvalidSession(session.id.to_string()));
        }

        debug!("Updated session");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Session>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE (?1 IS NULL OR owner = ?1) ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))?;

        let sessions = stmt
            .query_map(params![owner], Self::row_to_session)?
            .collect::<rusqlite::Result<Vec<Session>>>()?;

        debug!("Listed {} sessions", sessions.len());
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_session_store() {
        let store = SqliteSessionStore::in_memory().unwrap();

        let mut session = Session::new(Some("alice".to_string()));
        store.create(&session).await.unwrap();
        assert!(store.create(&session).await.is_err());

        session.record_chunk(15_000, Some("hello world"));
        session.record_chunk(15_000, Some("how are you"));
        session.set_summary("Greetings.".to_string(), "short", "en");
        session.set_translation("こんにちは".to_string(), "ja");
        store.update(&session).await.unwrap();

        let loaded = store.get(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.transcript, "hello world how are you");
        assert_eq!(loaded.transcription_calls, 2);
        assert_eq!(loaded.accumulated_bytes, 30_000);
        assert_eq!(loaded.summary.as_deref(), Some("Greetings."));
        assert_eq!(loaded.summary_type.as_deref(), Some("short"));
        assert_eq!(loaded.translation.as_deref(), Some("こんにちは"));
        assert_eq!(loaded.owner.as_deref(), Some("alice"));
        assert_eq!(
            loaded.created_at.timestamp_micros(),
            session.created_at.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_missing_session() {
        let store = SqliteSessionStore::in_memory().unwrap();
        assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());

        let err = store.update(&Session::new(None)).await.unwrap_err();
        assert!(matches!(err, VoxnoteError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let store = SqliteSessionStore::in_memory().unwrap();
        store.create(&Session::new(Some("alice".to_string()))).await.unwrap();
        store.create(&Session::new(Some("bob".to_string()))).await.unwrap();
        store.create(&Session::new(None)).await.unwrap();

        assert_eq!(store.list(None).await.unwrap().len(), 3);

        let alice = store.list(Some("alice")).await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].owner.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        let session = Session::new(None);
        {
            let store = SqliteSessionStore::new(&path).unwrap();
            store.create(&session).await.unwrap();
        }

        let store = SqliteSessionStore::new(&path).unwrap();
        assert!(store.get(&session.id).await.unwrap().is_some());
    }
}
