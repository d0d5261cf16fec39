//! Conversation context persistence
//!
//! [`ContextStore`] has three backends: one JSON file per session, a
//! SQLite table, and a process-local map for tests.

use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::session::ConversationContext;
use crate::{Error, Result};

/// Storage for conversation contexts, keyed by conversation id
pub trait ContextStore: Send + Sync {
    /// Insert or replace
    fn save(&self, context: &ConversationContext) -> Result<()>;

    /// `Ok(None)` when nothing was saved under `id`
    fn load(&self, id: &str) -> Result<Option<ConversationContext>>;

    fn delete(&self, id: &str) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Other("context store lock poisoned".into()))
}

/// `<dir>/session_<id>.json`
pub struct FileContextStore {
    dir: PathBuf,
}

impl FileContextStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(Error::Other(format!("Invalid session id: {}", id)));
        }
        Ok(self.dir.join(format!("session_{}.json", id)))
    }
}

impl ContextStore for FileContextStore {
    fn save(&self, context: &ConversationContext) -> Result<()> {
        let path = self.path_for(&context.conversation_id)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(context)?)?;
        debug!("Saved session to {}", path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ConversationContext>> {
        let path = self.path_for(id)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(id)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// SQLite-backed store
pub struct SqliteContextStore {
    conn: Mutex<Connection>,
}

impl SqliteContextStore {
    /// Open (or create) the database at `db_path`
    pub fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(db_path)?)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                context TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ContextStore for SqliteContextStore {
    fn save(&self, context: &ConversationContext) -> Result<()> {
        let json = serde_json::to_string(context)?;
        lock(&self.conn)?.execute(
            "INSERT OR REPLACE INTO conversations (id, context, updated_at) VALUES (?1, ?2, ?3)",
            params![
                context.conversation_id,
                json,
                context.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ConversationContext>> {
        let result = lock(&self.conn)?.query_row(
            "SELECT context FROM conversations WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        lock(&self.conn)?.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
        Ok(())
    }
}

/// Process-local store
#[derive(Default)]
pub struct InMemoryContextStore {
    contexts: Mutex<HashMap<String, ConversationContext>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contexts.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContextStore for InMemoryContextStore {
    fn save(&self, context: &ConversationContext) -> Result<()> {
        lock(&self.contexts)?.insert(context.conversation_id.clone(), context.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ConversationContext>> {
        Ok(lock(&self.contexts)?.get(id).cloned())
    }

    fn delete(&self, id: &str) -> Result<()> {
        lock(&self.contexts)?.remove(id);
        Ok(())
    }
}
