//! Feedback Store: one SQLite table, append and read-all only.
//!
//! A single connection sits behind a mutex; SQLite's own writer lock
//! serializes concurrent inserts.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use wellbot_common::{FeedbackRecord, ValidFeedback, WellbotError};

type StoreResult<T> = Result<T, WellbotError>;

fn storage_err(e: impl std::fmt::Display) -> WellbotError {
    WellbotError::Storage(e.to_string())
}

/// Where the feedback database lives
#[derive(Debug, Clone)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database, used by tests
    Memory,
}

impl StoreLocation {
    pub fn describe(&self) -> String {
        match self {
            StoreLocation::File(path) => path.display().to_string(),
            StoreLocation::Memory => ":memory:".to_string(),
        }
    }
}

pub struct FeedbackStore {
    conn: Arc<Mutex<Connection>>,
    location: StoreLocation,
}

impl FeedbackStore {
    /// Open or create the feedback database
    pub async fn open(location: StoreLocation) -> StoreResult<Self> {
        if let StoreLocation::File(path) = &location {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!("Opening feedback database at: {}", location.describe());

        let target = location.clone();
        let conn = tokio::task::spawn_blocking(move || -> StoreResult<Connection> {
            let conn = match &target {
                StoreLocation::File(path) => Connection::open(path),
                StoreLocation::Memory => Connection::open_in_memory(),
            }
            .map_err(storage_err)?;

            if matches!(target, StoreLocation::File(_)) {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(storage_err)?;
            }

            conn.execute(
                "CREATE TABLE IF NOT EXISTS feedback (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    usefulness INTEGER,
                    accuracy INTEGER,
                    comments TEXT,
                    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )
            .map_err(storage_err)?;

            Ok(conn)
        })
        .await
        .map_err(storage_err)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    pub async fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(StoreLocation::File(path.as_ref().to_path_buf())).await
    }

    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreLocation::Memory).await
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Append a validated record, returning its new id
    pub async fn insert(&self, feedback: ValidFeedback) -> StoreResult<i64> {
        let conn = Arc::clone(&self.conn);

        let id = tokio::task::spawn_blocking(move || -> StoreResult<i64> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO feedback (usefulness, accuracy, comments) VALUES (?1, ?2, ?3)",
                params![feedback.usefulness, feedback.accuracy, feedback.comments],
            )
            .map_err(storage_err)?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(storage_err)??;

        debug!("Stored feedback #{}", id);
        Ok(id)
    }

    /// All records, newest first
    pub async fn list(&self) -> StoreResult<Vec<FeedbackRecord>> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> StoreResult<Vec<FeedbackRecord>> {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(
                    "SELECT id, usefulness, accuracy, comments, timestamp
                     FROM feedback
                     ORDER BY timestamp DESC, id DESC",
                )
                .map_err(storage_err)?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(FeedbackRecord {
                        id: row.get(0)?,
                        usefulness: row.get(1)?,
                        accuracy: row.get(2)?,
                        comments: row.get(3)?,
                        timestamp: row.get(4)?,
                    })
                })
                .map_err(storage_err)?;

            rows.collect::<Result<Vec<_>, _>>().map_err(storage_err)
        })
        .await
        .map_err(storage_err)?
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> StoreResult<i64> {
            let conn = conn.blocking_lock();
            conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
                .map_err(storage_err)
        })
        .await
        .map_err(storage_err)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(usefulness: i64, accuracy: i64, comments: Option<&str>) -> ValidFeedback {
        ValidFeedback {
            usefulness,
            accuracy,
            comments: comments.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = FeedbackStore::open_in_memory().await.unwrap();

        let mut last = 0;
        for i in 1..=5 {
            let id = store.insert(valid(i, 6 - i, None)).await.unwrap();
            assert!(id > last, "id {} should exceed {}", id, last);
            last = id;
        }
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = FeedbackStore::open_in_memory().await.unwrap();
        store.insert(valid(1, 1, Some("first"))).await.unwrap();
        store.insert(valid(2, 2, Some("second"))).await.unwrap();
        store.insert(valid(3, 3, None)).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].usefulness, 3);
        assert!(records[0].comments.is_none());
        assert_eq!(records[2].comments.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("feedback.db");

        {
            let store = FeedbackStore::open_path(&path).await.unwrap();
            store.insert(valid(4, 4, Some("kept"))).await.unwrap();
        }

        let store = FeedbackStore::open_path(&path).await.unwrap();
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comments.as_deref(), Some("kept"));

        let next = store.insert(valid(5, 5, None)).await.unwrap();
        assert!(next > records[0].id);
    }
}
