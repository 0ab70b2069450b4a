//! Remote source boundary: filtered reads and pagination
//!
//! The transport itself (HTTP client, auth headers, REST query building) is
//! owned by the caller behind [`RemoteSource`]. This module only knows how to
//! ask for one table's changed rows in deterministic order and how to drain
//! tables too large for a single round trip.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{TableSyncConfig, DEFAULT_PAGE_SIZE};
use crate::models::RemoteRecord;

/// Errors surfaced by the remote source
///
/// Never retried here; the caller owns retry/backoff policy. A failed fetch
/// aborts the table's sync before any local mutation or checkpoint write.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// Network-level failure reaching the remote
    #[error("Transport error: {0}")]
    Transport(String),
    /// The remote backend rejected or failed the query
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Strictly-greater-than filter on one timestamp column
///
/// Strictly greater, not greater-or-equal, so the boundary record is not
/// re-fetched on every subsequent sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// Column the filter applies to
    pub field: String,
    /// Select only rows with a column value after this instant
    pub after: DateTime<Utc>,
}

/// A source of remote table rows
///
/// Implementations must honor the filter as strictly-greater-than, sort by
/// `order_by` in the requested direction, and apply `range` as inclusive row
/// offsets when given.
#[allow(async_fn_in_trait)]
pub trait RemoteSource {
    /// Query one table for rows
    async fn query(
        &self,
        table: &str,
        filter: Option<&FieldFilter>,
        order_by: &str,
        ascending: bool,
        limit: Option<usize>,
        range: Option<(usize, usize)>,
    ) -> Result<Vec<RemoteRecord>, RemoteError>;
}

/// Reads one table's changed rows from a [`RemoteSource`]
///
/// Results are always requested ascending by the configured ordering column,
/// so the maximum timestamp in a batch is deterministic and the checkpoint
/// advances the same way on every run.
pub struct RemoteReader<'a, S> {
    source: &'a S,
    config: &'a TableSyncConfig,
}

impl<'a, S: RemoteSource> RemoteReader<'a, S> {
    /// Create a reader for one table
    #[must_use]
    pub const fn new(source: &'a S, config: &'a TableSyncConfig) -> Self {
        Self { source, config }
    }

    fn filter(&self, since: Option<DateTime<Utc>>) -> Option<FieldFilter> {
        since.map(|after| FieldFilter {
            field: self.config.remote_ts_field.clone(),
            after,
        })
    }

    async fn fetch_page(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
        range: Option<(usize, usize)>,
    ) -> Result<Vec<RemoteRecord>, RemoteError> {
        self.source
            .query(
                &self.config.table,
                self.filter(since).as_ref(),
                &self.config.order_by,
                true,
                limit,
                range,
            )
            .await
    }

    /// Fetch a single page, honoring the configured record cap as the limit
    pub async fn fetch(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteRecord>, RemoteError> {
        self.fetch_page(since, self.config.max_records, None).await
    }

    /// Fetch all pages exhaustively
    ///
    /// Pages are fetched sequentially with a fixed page size (the default, or
    /// the configured cap if smaller). Stops on an empty page, after a short
    /// page, or once the cap is reached (truncating to it).
    pub async fn fetch_all(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteRecord>, RemoteError> {
        let cap = self.config.max_records;
        let page_size = cap.map_or(DEFAULT_PAGE_SIZE, |cap| cap.clamp(1, DEFAULT_PAGE_SIZE));
        let mut rows: Vec<RemoteRecord> = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .fetch_page(since, None, Some((offset, offset + page_size - 1)))
                .await?;
            if page.is_empty() {
                break;
            }

            let short_page = page.len() < page_size;
            rows.extend(page);

            if short_page {
                break;
            }
            if let Some(cap) = cap {
                if rows.len() >= cap {
                    rows.truncate(cap);
                    break;
                }
            }
            offset += page_size;
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Fake remote serving a fixed row list, honoring range and filter args
    struct FakeRemote {
        rows: Vec<RemoteRecord>,
        calls: Mutex<Vec<Option<FieldFilter>>>,
    }

    impl FakeRemote {
        fn with_rows(count: usize) -> Self {
            let rows = (0..count)
                .map(|i| {
                    let mut fields = serde_json::Map::new();
                    fields.insert("uuid".to_string(), serde_json::json!(format!("r{i}")));
                    RemoteRecord::new(fields)
                })
                .collect();
            Self {
                rows,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RemoteSource for FakeRemote {
        async fn query(
            &self,
            _table: &str,
            filter: Option<&FieldFilter>,
            _order_by: &str,
            ascending: bool,
            limit: Option<usize>,
            range: Option<(usize, usize)>,
        ) -> Result<Vec<RemoteRecord>, RemoteError> {
            assert!(ascending);
            self.calls.lock().unwrap().push(filter.cloned());

            let mut rows = self.rows.clone();
            if let Some((start, end)) = range {
                rows = rows
                    .into_iter()
                    .skip(start)
                    .take(end - start + 1)
                    .collect();
            }
            if let Some(limit) = limit {
                rows.truncate(limit);
            }
            Ok(rows)
        }
    }

    fn uuids(rows: &[RemoteRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.str_field("uuid").unwrap()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_single_page_passes_filter() {
        let remote = FakeRemote::with_rows(3);
        let config = TableSyncConfig::new("notes");
        let reader = RemoteReader::new(&remote, &config);
        let since = "2024-01-01T00:00:00Z".parse().unwrap();

        let rows = reader.fetch(Some(since)).await.unwrap();
        assert_eq!(rows.len(), 3);

        let calls = remote.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            Some(FieldFilter {
                field: "updated_at".to_string(),
                after: since,
            })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_full_pull_has_no_filter() {
        let remote = FakeRemote::with_rows(1);
        let config = TableSyncConfig::new("notes");
        let reader = RemoteReader::new(&remote, &config);

        reader.fetch(None).await.unwrap();
        assert_eq!(remote.calls.lock().unwrap()[0], None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_exhausts_pages_without_dupes_or_gaps() {
        // 2 full pages of 1000 plus a final partial page of 500
        let remote = FakeRemote::with_rows(2500);
        let config = TableSyncConfig::new("notes").paginated();
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch_all(None).await.unwrap();
        assert_eq!(rows.len(), 2500);
        assert_eq!(rows[0].str_field("uuid"), Some("r0"));
        assert_eq!(rows[2499].str_field("uuid"), Some("r2499"));

        let ids: std::collections::HashSet<_> = uuids(&rows).into_iter().collect();
        assert_eq!(ids.len(), 2500);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_stops_on_empty_first_page() {
        let remote = FakeRemote::with_rows(0);
        let config = TableSyncConfig::new("notes").paginated();
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch_all(None).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(remote.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_exact_page_boundary_needs_one_extra_call() {
        let remote = FakeRemote::with_rows(1000);
        let config = TableSyncConfig::new("notes").paginated();
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch_all(None).await.unwrap();
        assert_eq!(rows.len(), 1000);
        // full page, then the empty page that terminates the loop
        assert_eq!(remote.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_truncates_to_cap() {
        let remote = FakeRemote::with_rows(2500);
        let config = TableSyncConfig::new("notes").paginated().with_max_records(1500);
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch_all(None).await.unwrap();
        assert_eq!(rows.len(), 1500);
        assert_eq!(rows[1499].str_field("uuid"), Some("r1499"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_cap_smaller_than_page_shrinks_page_size() {
        let remote = FakeRemote::with_rows(2500);
        let config = TableSyncConfig::new("notes").paginated().with_max_records(10);
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch_all(None).await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(remote.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_single_page_uses_cap_as_limit() {
        let remote = FakeRemote::with_rows(50);
        let config = TableSyncConfig::new("notes").with_max_records(20);
        let reader = RemoteReader::new(&remote, &config);

        let rows = reader.fetch(None).await.unwrap();
        assert_eq!(rows.len(), 20);
    }
}
