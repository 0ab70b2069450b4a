//! Merge engine: last-writer-wins reconciliation of remote batches
//!
//! [`plan_merge`] is a pure function from a fetched remote batch and the full
//! local table contents to a buffered mutation plan. Nothing is applied here;
//! the orchestrator applies the whole plan as one batch and only then writes
//! the checkpoint, so a cancelled or failed sync leaves no partial state.
//!
//! Merging is idempotent: re-planning the same batch against an already
//! merged local table produces an empty plan.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::config::TableSyncConfig;
use crate::models::{LocalRecord, MergeConflict, RemoteRecord};

/// Buffered mutation sets for one table, plus the next checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// Remote rows with no local counterpart
    pub to_insert: Vec<LocalRecord>,
    /// Local key paired with the full replacement record
    pub to_update: Vec<(String, LocalRecord)>,
    /// Local keys of rows deleted remotely
    pub to_delete: Vec<String>,
    /// Maximum remote timestamp observed in the fetched batch, or "now" when
    /// the batch carried none
    pub checkpoint: DateTime<Utc>,
    /// Unsynced local edits protected by the grace margin
    pub conflicts: Vec<MergeConflict>,
}

impl MergePlan {
    /// Whether the plan mutates nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Map a remote row into the local record that would replace or create it
///
/// The merged copy is marked `synced` and carries the remote timestamp, so a
/// second pass over the same batch decides "no mutation" for it.
fn map_remote(record: &RemoteRecord, config: &TableSyncConfig) -> LocalRecord {
    let key = record
        .str_field(&config.remote_id_field)
        .unwrap_or_default()
        .to_string();
    LocalRecord {
        remote_id: (!key.is_empty()).then(|| key.clone()),
        key,
        synced: true,
        updated_at: record.timestamp(&config.remote_ts_field),
        fields: record.fields().clone(),
    }
}

/// Compute the mutation plan for one fetched batch
///
/// `local_rows` must be the full current contents of the target table;
/// tombstone detection is relative to the fetched batch, so on incremental
/// pulls only recently-changed identifiers are visible and deletions of
/// untouched rows go unnoticed until the next full pull. That approximation
/// is by contract, not an oversight.
#[must_use]
pub fn plan_merge(
    remote_batch: &[RemoteRecord],
    local_rows: &[LocalRecord],
    config: &TableSyncConfig,
    now: DateTime<Utc>,
) -> MergePlan {
    let grace = Duration::milliseconds(config.grace_margin_ms);

    let local_by_key: HashMap<&str, &LocalRecord> = local_rows
        .iter()
        .map(|row| (row.key.as_str(), row))
        .collect();

    let remote_ids: HashSet<&str> = remote_batch
        .iter()
        .filter_map(|record| record.str_field(&config.remote_id_field))
        .filter(|id| !id.is_empty())
        .collect();

    let mut to_insert = Vec::new();
    let mut to_update = Vec::new();
    let mut to_delete = Vec::new();
    let mut conflicts = Vec::new();

    // Rows confirmed to exist remotely but absent from this batch were
    // deleted on the server. Rows never uploaded (remote_id None) are exempt.
    if config.delete_remotes {
        for local in local_rows {
            if local.remote_id.is_some() && !remote_ids.contains(local.key.as_str()) {
                to_delete.push(local.key.clone());
            }
        }
    }

    for record in remote_batch {
        let id = record
            .str_field(&config.remote_id_field)
            .filter(|id| !id.is_empty());
        if id.is_none() && config.require_uuid {
            tracing::debug!(
                table = %config.table,
                field = %config.remote_id_field,
                "skipping remote record without external identifier"
            );
            continue;
        }

        let Some(local) = local_by_key.get(id.unwrap_or_default()) else {
            to_insert.push(map_remote(record, config));
            continue;
        };

        let remote_ts = record
            .timestamp(&config.remote_ts_field)
            .unwrap_or(DateTime::UNIX_EPOCH);
        let local_ts = local.local_timestamp();

        // An in-flight local edit wins unless the remote copy is newer by
        // more than the grace margin.
        if !local.synced && local_ts >= remote_ts - grace {
            conflicts.push(MergeConflict {
                key: local.key.clone(),
                local_updated_at: local_ts,
                incoming_updated_at: remote_ts,
                resolved_at: now,
                strategy: "local-wins".to_string(),
            });
            continue;
        }

        // A row never confirmed server-side takes the remote copy as
        // authoritative; otherwise strictly-newer remote state wins.
        if local.remote_id.is_none() || local_ts < remote_ts {
            to_update.push((local.key.clone(), map_remote(record, config)));
        }
    }

    // Skipped records still represent observed remote state; the checkpoint
    // covers the whole fetched batch so they are not re-fetched forever.
    let checkpoint = remote_batch
        .iter()
        .filter_map(|record| record.timestamp(&config.remote_ts_field))
        .max()
        .unwrap_or(now);

    MergePlan {
        to_insert,
        to_update,
        to_delete,
        checkpoint,
        conflicts,
    }
}
