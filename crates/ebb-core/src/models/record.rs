//! Remote and local record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One row fetched from the remote source
///
/// An opaque column-name to value mapping. The external identifier and
/// update-timestamp columns are read through the per-table configuration
/// rather than fixed field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRecord(Map<String, Value>);

impl RemoteRecord {
    /// Wrap a raw column map
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Read a string column, if present and non-null
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Parse a timestamp column
    ///
    /// Accepts RFC 3339 strings or integer Unix milliseconds. Returns `None`
    /// for absent, null, or unparseable values; callers treat that as epoch.
    #[must_use]
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.0.get(name)? {
            Value::String(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc)),
            Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }

    /// Borrow the raw column map
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record, yielding the raw column map
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RemoteRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One row of a replicated local table
///
/// The bookkeeping columns every replicated table carries are typed here; the
/// entity payload stays an opaque column map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Local primary key; by convention the remote external identifier
    pub key: String,
    /// Set once the record is known to exist remotely; `None` for
    /// locally-created records not yet uploaded
    pub remote_id: Option<String>,
    /// True once the local copy matches the last fetched remote state;
    /// false means a local edit has not been pushed yet
    pub synced: bool,
    /// Local update timestamp, set by local writes and by merge
    pub updated_at: Option<DateTime<Utc>>,
    /// Entity payload columns
    pub fields: Map<String, Value>,
}

impl LocalRecord {
    /// Create a locally-authored record that has not been uploaded yet
    #[must_use]
    pub fn new_local(fields: Map<String, Value>) -> Self {
        Self {
            key: Uuid::now_v7().to_string(),
            remote_id: None,
            synced: false,
            updated_at: Some(Utc::now()),
            fields,
        }
    }

    /// Local update timestamp, falling back to epoch when unset
    #[must_use]
    pub fn local_timestamp(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(DateTime::UNIX_EPOCH)
    }
}
