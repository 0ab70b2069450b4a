//! In-memory checkpoint store

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::CheckpointStore;
use crate::error::{Error, Result};

/// In-memory implementation of [`CheckpointStore`]
///
/// Not durable; intended for tests and callers that deliberately re-pull
/// everything on restart.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryCheckpointStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>>> {
        self.inner
            .lock()
            .map_err(|_| Error::Store("checkpoint store mutex poisoned".to_string()))
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn get(&self, table: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock()?.get(table).copied())
    }

    fn set(&self, table: &str, merged_through: DateTime<Utc>) -> Result<()> {
        self.lock()?.insert(table.to_string(), merged_through);
        Ok(())
    }

    fn clear(&self, table: Option<&str>) -> Result<()> {
        let mut inner = self.lock()?;
        match table {
            Some(table) => {
                inner.remove(table);
            }
            None => inner.clear(),
        }
        Ok(())
    }
}
