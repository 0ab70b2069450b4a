//! SQLite-backed checkpoint store

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::CheckpointStore;
use crate::error::{Error, Result};

/// `SQLite` implementation of [`CheckpointStore`]
///
/// Checkpoints survive process restarts. The connection is behind a mutex so
/// independent table-sync tasks can share one store.
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

impl SqliteCheckpointStore {
    /// Open a checkpoint store at the given path, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory checkpoint store (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sync_checkpoints (
                table_name TEXT PRIMARY KEY,
                merged_through TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("checkpoint store mutex poisoned".to_string()))
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn get(&self, table: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT merged_through FROM sync_checkpoints WHERE table_name = ?",
                params![table],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => {
                let parsed = DateTime::parse_from_rfc3339(&raw)?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }

    fn set(&self, table: &str, merged_through: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sync_checkpoints (table_name, merged_through, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(table_name) DO UPDATE SET
                 merged_through = excluded.merged_through,
                 updated_at = excluded.updated_at",
            params![
                table,
                merged_through.to_rfc3339_opts(SecondsFormat::Millis, true),
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            ],
        )?;
        Ok(())
    }

    fn clear(&self, table: Option<&str>) -> Result<()> {
        let conn = self.lock()?;
        match table {
            Some(table) => {
                conn.execute(
                    "DELETE FROM sync_checkpoints WHERE table_name = ?",
                    params![table],
                )?;
            }
            None => {
                conn.execute("DELETE FROM sync_checkpoints", [])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = SqliteCheckpointStore::open_in_memory().unwrap();
        assert_eq!(store.get("notes").unwrap(), None);
    }

    #[test]
    fn test_set_and_get_roundtrip_with_millis() {
        let store = SqliteCheckpointStore::open_in_memory().unwrap();
        let checkpoint = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 1).unwrap()
            + chrono::Duration::milliseconds(250);

        store.set("notes", checkpoint).unwrap();
        assert_eq!(store.get("notes").unwrap(), Some(checkpoint));
    }

    #[test]
    fn test_set_overwrites_previous_checkpoint() {
        let store = SqliteCheckpointStore::open_in_memory().unwrap();
        store.set("notes", ts("2024-01-01T00:00:00Z")).unwrap();
        store.set("notes", ts("2024-01-02T00:00:00Z")).unwrap();

        assert_eq!(
            store.get("notes").unwrap(),
            Some(ts("2024-01-02T00:00:00Z"))
        );
    }

    #[test]
    fn test_clear_one_table() {
        let store = SqliteCheckpointStore::open_in_memory().unwrap();
        store.set("notes", ts("2024-01-01T00:00:00Z")).unwrap();
        store.set("tags", ts("2024-01-01T00:00:00Z")).unwrap();

        store.clear(Some("notes")).unwrap();
        assert_eq!(store.get("notes").unwrap(), None);
        assert!(store.get("tags").unwrap().is_some());
    }

    #[test]
    fn test_clear_all_tables() {
        let store = SqliteCheckpointStore::open_in_memory().unwrap();
        store.set("notes", ts("2024-01-01T00:00:00Z")).unwrap();
        store.set("tags", ts("2024-01-01T00:00:00Z")).unwrap();

        store.clear(None).unwrap();
        assert_eq!(store.get("notes").unwrap(), None);
        assert_eq!(store.get("tags").unwrap(), None);
    }

    #[test]
    fn test_checkpoints_survive_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("checkpoints.db");

        {
            let store = SqliteCheckpointStore::open(&path).unwrap();
            store.set("notes", ts("2024-01-01T00:00:00Z")).unwrap();
        }

        let reopened = SqliteCheckpointStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("notes").unwrap(),
            Some(ts("2024-01-01T00:00:00Z"))
        );
    }
}
