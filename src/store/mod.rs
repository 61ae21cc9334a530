//! Session store abstraction for Voxnote.
//!
//! Provides a trait-based interface so the backing store (process memory or a
//! database) is a configuration detail.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::config::{Settings, StoreProvider};
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait for session store implementations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails if the identifier already exists.
    async fn create(&self, session: &Session) -> Result<()>;

    /// Fetch a session by identifier.
    async fn get(&self, id: &Uuid) -> Result<Option<Session>>;

    /// Replace a stored session. Fails if it does not exist.
    async fn update(&self, session: &Session) -> Result<()>;

    /// List sessions, newest first, optionally restricted to one owner.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Session>>;
}

/// Build the store selected in the settings.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match settings.store.provider {
        StoreProvider::Sqlite => Arc::new(SqliteSessionStore::new(&settings.sqlite_path())?),
        StoreProvider::Memory => Arc::new(MemorySessionStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let mut settings = Settings::default();
        settings.store.provider = StoreProvider::Memory;

        let store = open_store(&settings).unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.store.sqlite_path = dir.path().join("nested/sessions.db").display().to_string();

        let store = open_store(&settings).unwrap();
        let session = Session::new(None);
        store.create(&session).await.unwrap();
        assert!(store.get(&session.id).await.unwrap().is_some());
    }
}
