//! ebb-core - Core library for ebb
//!
//! Pull-side replication engine for offline-first apps: per-table
//! checkpointing, incremental fetch with pagination, remote-tombstone
//! detection, and last-writer-wins merging that preserves local edits not yet
//! pushed to the server.
//!
//! The transport and the local table storage stay on the caller's side of the
//! [`remote::RemoteSource`] and [`engine::LocalStore`] traits; this crate
//! owns the decision logic between them.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod models;
pub mod remote;

pub use checkpoint::{CheckpointStore, MemoryCheckpointStore, SqliteCheckpointStore};
pub use config::TableSyncConfig;
pub use engine::{LocalStore, SyncEngine, SyncGuard, SyncLock};
pub use error::{Error, Result};
pub use merge::MergePlan;
pub use models::{LocalRecord, MergeConflict, RemoteRecord, SyncReport};
pub use remote::{FieldFilter, RemoteError, RemoteSource};
