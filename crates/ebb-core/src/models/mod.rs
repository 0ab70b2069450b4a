//! Data models for ebb-core

mod conflict;
mod record;
mod report;

pub use conflict::MergeConflict;
pub use record::{LocalRecord, RemoteRecord};
pub use report::SyncReport;
