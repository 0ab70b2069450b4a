//! Table sync orchestration
//!
//! Drives one table's full pull cycle: read checkpoint, decide full vs.
//! incremental, fetch, plan the merge, apply the buffered plan, persist the
//! checkpoint. A fetch or apply failure short-circuits before the checkpoint
//! write, so the next sync re-fetches the same window; merging is idempotent,
//! so that is safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::checkpoint::CheckpointStore;
use crate::config::TableSyncConfig;
use crate::error::Result;
use crate::merge;
use crate::models::{LocalRecord, SyncReport};
use crate::remote::{RemoteReader, RemoteSource};

/// Bulk storage operations for replicated local tables
///
/// Bulk-only by contract; replicated tables run to tens of thousands of rows.
/// Implementations take `&self` and own their interior locking, so
/// independent table-sync tasks can share one store. Applying a whole plan
/// inside one storage transaction is the implementation's choice; the engine
/// already buffers the full plan before applying any of it.
pub trait LocalStore {
    /// Read the full contents of a table
    fn scan(&self, table: &str) -> Result<Vec<LocalRecord>>;

    /// Insert new rows
    fn bulk_insert(&self, table: &str, records: Vec<LocalRecord>) -> Result<()>;

    /// Replace existing rows by key
    fn bulk_update(&self, table: &str, updates: Vec<(String, LocalRecord)>) -> Result<()>;

    /// Delete rows by key
    fn bulk_delete(&self, table: &str, keys: Vec<String>) -> Result<()>;
}

/// Pull-side replication engine over a remote source, a local store, and a
/// checkpoint store
pub struct SyncEngine<R, L, C> {
    remote: R,
    local: L,
    checkpoints: C,
}

impl<R, L, C> SyncEngine<R, L, C>
where
    R: RemoteSource,
    L: LocalStore,
    C: CheckpointStore,
{
    /// Create an engine from its three collaborators
    pub const fn new(remote: R, local: L, checkpoints: C) -> Self {
        Self {
            remote,
            local,
            checkpoints,
        }
    }

    /// Access the checkpoint store, e.g. to clear checkpoints for recovery
    pub const fn checkpoints(&self) -> &C {
        &self.checkpoints
    }

    /// Run one sync cycle for one table
    ///
    /// Returns advisory mutation counts. Checkpoint and local store are left
    /// untouched when the fetch fails; the checkpoint is only written after
    /// every local mutation succeeded.
    pub async fn sync_table(&self, config: &TableSyncConfig) -> Result<SyncReport> {
        let checkpoint = self.checkpoints.get(&config.table)?;
        let since = if config.force_full_pull {
            None
        } else {
            checkpoint
        };

        let reader = RemoteReader::new(&self.remote, config);
        let batch = if config.paginate {
            reader.fetch_all(since).await?
        } else {
            reader.fetch(since).await?
        };
        tracing::debug!(
            table = %config.table,
            rows = batch.len(),
            incremental = since.is_some(),
            "fetched remote batch"
        );

        let local_rows = self.local.scan(&config.table)?;
        let plan = merge::plan_merge(&batch, &local_rows, config, Utc::now());
        let report = SyncReport {
            inserted: plan.to_insert.len(),
            updated: plan.to_update.len(),
            deleted: plan.to_delete.len(),
            conflicts: plan.conflicts.len(),
        };

        if !plan.to_delete.is_empty() {
            self.local.bulk_delete(&config.table, plan.to_delete)?;
        }
        if !plan.to_insert.is_empty() {
            self.local.bulk_insert(&config.table, plan.to_insert)?;
        }
        if !plan.to_update.is_empty() {
            self.local.bulk_update(&config.table, plan.to_update)?;
        }

        self.checkpoints.set(&config.table, plan.checkpoint)?;

        tracing::info!(
            table = %config.table,
            inserted = report.inserted,
            updated = report.updated,
            deleted = report.deleted,
            conflicts = report.conflicts,
            checkpoint = %plan.checkpoint,
            "table sync complete"
        );
        Ok(report)
    }
}

/// Explicit sync-in-progress state
///
/// Replaces an ambient "currently syncing" flag: callers that must not
/// overlap syncs acquire a guard first and hold it for the duration.
#[derive(Debug, Clone, Default)]
pub struct SyncLock {
    busy: Arc<AtomicBool>,
}

impl SyncLock {
    /// Create an idle lock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark a sync as in progress
    ///
    /// Returns `None` when another sync already holds the lock.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SyncGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether a sync is currently in progress
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held while a sync is in progress; released on drop
#[derive(Debug)]
pub struct SyncGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
