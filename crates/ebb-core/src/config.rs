//! Per-table replication configuration

/// Page size used by paginated fetches unless capped lower
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default grace margin protecting unsynced local edits, in milliseconds
///
/// Absorbs clock skew and round-trip noise between a local edit landing and a
/// remote fetch that started before it.
pub const DEFAULT_GRACE_MARGIN_MS: i64 = 1000;

/// Configuration for replicating one remote table into the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSyncConfig {
    /// Remote table name (also used as the local table name and checkpoint key)
    pub table: String,
    /// Column remote results are ordered by, ascending
    pub order_by: String,
    /// External identifier column on remote rows
    pub remote_id_field: String,
    /// Update-timestamp column on remote rows
    pub remote_ts_field: String,
    /// Primary-key column on local rows (the external identifier by convention)
    pub local_key_field: String,
    /// Update-timestamp column on local rows
    pub local_ts_field: String,
    /// Fetch all pages instead of a single page
    pub paginate: bool,
    /// Cap on the total number of fetched records
    pub max_records: Option<usize>,
    /// Ignore the checkpoint and always fetch the whole table
    ///
    /// Used for small reference tables where losing a record to checkpoint
    /// drift is unacceptable.
    pub force_full_pull: bool,
    /// Delete local rows whose external id is absent from the fetched batch
    pub delete_remotes: bool,
    /// Skip remote records missing the external identifier
    pub require_uuid: bool,
    /// Grace margin in milliseconds for unsynced local edits
    pub grace_margin_ms: i64,
}

impl TableSyncConfig {
    /// Create a configuration for `table` with default field names
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            order_by: "updated_at".to_string(),
            remote_id_field: "uuid".to_string(),
            remote_ts_field: "updated_at".to_string(),
            local_key_field: "id".to_string(),
            local_ts_field: "updatedAt".to_string(),
            paginate: false,
            max_records: None,
            force_full_pull: false,
            delete_remotes: false,
            require_uuid: true,
            grace_margin_ms: DEFAULT_GRACE_MARGIN_MS,
        }
    }

    /// Set the remote ordering column
    #[must_use]
    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = column.into();
        self
    }

    /// Set the external identifier column on remote rows
    #[must_use]
    pub fn with_remote_id_field(mut self, field: impl Into<String>) -> Self {
        self.remote_id_field = field.into();
        self
    }

    /// Set the remote and local update-timestamp columns
    #[must_use]
    pub fn with_timestamp_fields(
        mut self,
        remote: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        self.remote_ts_field = remote.into();
        self.local_ts_field = local.into();
        self
    }

    /// Set the local primary-key column
    #[must_use]
    pub fn with_local_key_field(mut self, field: impl Into<String>) -> Self {
        self.local_key_field = field.into();
        self
    }

    /// Fetch all pages exhaustively instead of a single page
    #[must_use]
    pub const fn paginated(mut self) -> Self {
        self.paginate = true;
        self
    }

    /// Cap the total number of fetched records
    #[must_use]
    pub const fn with_max_records(mut self, cap: usize) -> Self {
        self.max_records = Some(cap);
        self
    }

    /// Always fetch the whole table regardless of checkpoint
    #[must_use]
    pub const fn force_full_pull(mut self) -> Self {
        self.force_full_pull = true;
        self
    }

    /// Enable remote-tombstone detection for this table
    #[must_use]
    pub const fn delete_remotes(mut self) -> Self {
        self.delete_remotes = true;
        self
    }

    /// Pass through remote records missing the external identifier
    #[must_use]
    pub const fn allow_missing_uuid(mut self) -> Self {
        self.require_uuid = false;
        self
    }

    /// Override the grace margin in milliseconds
    #[must_use]
    pub const fn with_grace_margin_ms(mut self, millis: i64) -> Self {
        self.grace_margin_ms = millis;
        self
    }
}
