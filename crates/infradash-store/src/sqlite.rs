//! SQLite-based seen store.

use async_trait::async_trait;
use chrono::Utc;
use infradash_core::{DataError, Result, SeenSet, SeenStore};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Seen store backed by a SQLite database.
///
/// IDs are kept in a single `seen_ids` table together with the time they were
/// first recorded. Re-appending an ID is a no-op.
#[derive(Debug)]
pub struct SqliteSeenStore {
    conn: Mutex<Connection>,
}

impl SqliteSeenStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DataError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DataError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS seen_ids (
                id TEXT PRIMARY KEY NOT NULL,
                seen_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| DataError::Store(e.to_string()))?;

        debug!("SQLite seen store schema initialized");
        Ok(())
    }
}

#[async_trait]
impl SeenStore for SqliteSeenStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<SeenSet> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT id FROM seen_ids")
            .map_err(|e| DataError::Store(e.to_string()))?;

        let seen = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DataError::Store(e.to_string()))?
            .collect::<std::result::Result<SeenSet, _>>()
            .map_err(|e| DataError::Store(e.to_string()))?;

        debug!(count = seen.len(), "Loaded seen IDs");
        Ok(seen)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn append(&self, ids: &[String]) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Store(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        let tx = conn
            .transaction()
            .map_err(|e| DataError::Store(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare("INSERT OR IGNORE INTO seen_ids (id, seen_at) VALUES (?1, ?2)")
                .map_err(|e| DataError::Store(e.to_string()))?;
            for id in ids {
                stmt.execute(params![id, now])
                    .map_err(|e| DataError::Store(e.to_string()))?;
            }
        }

        tx.commit().map_err(|e| DataError::Store(e.to_string()))?;
        Ok(())
    }
}
