//! Sync outcome report

use serde::{Deserialize, Serialize};

/// Advisory counts from one table sync, for UI and telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Remote rows inserted locally
    pub inserted: usize,
    /// Local rows overwritten by newer remote state
    pub updated: usize,
    /// Local rows removed by tombstone detection
    pub deleted: usize,
    /// Unsynced local edits protected by the grace margin
    pub conflicts: usize,
}

impl SyncReport {
    /// Records mutated by the sync (inserted + updated)
    #[must_use]
    pub const fn mutated(&self) -> usize {
        self.inserted + self.updated
    }
}
