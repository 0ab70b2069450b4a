//! Per-table sync checkpoints
//!
//! A checkpoint is the maximum remote update timestamp already merged into
//! the local replica for one table. Absence means the table has never been
//! synced and gets a full pull.

mod memory;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::error::Result;

pub use memory::MemoryCheckpointStore;
pub use sqlite::SqliteCheckpointStore;

/// Durable key/value storage for per-table checkpoints
pub trait CheckpointStore {
    /// Read the checkpoint for a table, if one exists
    fn get(&self, table: &str) -> Result<Option<DateTime<Utc>>>;

    /// Record the checkpoint for a table
    fn set(&self, table: &str, merged_through: DateTime<Utc>) -> Result<()>;

    /// Clear the checkpoint for one table, or all checkpoints
    fn clear(&self, table: Option<&str>) -> Result<()>;
}
