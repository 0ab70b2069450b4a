//! Merge conflict model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recorded merge conflict resolved by strategy (e.g., local-wins)
///
/// Emitted when an unsynced local edit is protected from an incoming remote
/// record by the grace margin. Advisory only; it never changes the merge
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    /// Local key of the row involved in the conflict
    pub key: String,
    /// Existing local row's timestamp when the conflict occurred
    pub local_updated_at: DateTime<Utc>,
    /// Incoming remote row's timestamp that was rejected
    pub incoming_updated_at: DateTime<Utc>,
    /// Resolution timestamp
    pub resolved_at: DateTime<Utc>,
    /// Resolution strategy name
    pub strategy: String,
}
