//! Purge and load, expressed as pipeline runs.

use futures_util::stream;

use bulkstore_core::batch::MutationRequest;
use bulkstore_core::keys::Row;
use bulkstore_core::storage::{KeyValueStore, ScanRequest, StoreError};
use bulkstore_core::transform::{record_to_row, ImportContext, LineItem, RawRecord};

use crate::error::PipelineError;

use super::cursor;
use super::pipeline::{Pipeline, PipelineSummary};

pub const PURGE: &str = "purge";
pub const LOAD: &str = "load";

/// Deletes every row matched by `request`.
///
/// Only keys are read. Deleting an absent key is a no-op, so running a purge
/// again on an emptied range succeeds with zero applied requests.
pub async fn purge<S>(
    pipeline: &Pipeline<'_, S>,
    request: &ScanRequest,
) -> Result<PipelineSummary, PipelineError>
where
    S: KeyValueStore + ?Sized,
{
    let request = request.clone().keys_only();
    let rows = cursor::rows(pipeline.store(), &request);

    pipeline
        .run(PURGE, rows, |row: Row| MutationRequest::Delete(row.key))
        .await
}

/// Writes one row per record, keyed by its position in `records`.
pub async fn load<S>(
    pipeline: &Pipeline<'_, S>,
    records: Vec<RawRecord>,
    context: &ImportContext,
) -> Result<PipelineSummary, PipelineError>
where
    S: KeyValueStore + ?Sized,
{
    let source = stream::iter(
        records
            .into_iter()
            .enumerate()
            .map(Ok::<_, StoreError>),
    );

    pipeline
        .run(LOAD, source, |(index, record): (usize, RawRecord)| {
            MutationRequest::Put(record_to_row(index, &record, context))
        })
        .await
}

/// Typed view of the first `limit` records, as a load would write them.
pub fn preview(records: &[RawRecord], limit: usize) -> Vec<LineItem> {
    records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, record)| LineItem::from_record(index, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bulkstore_core::keys::{default_table_schema, IndexKey, PrimaryKey};
    use bulkstore_core::retry::RetryPolicy;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use crate::engine::pipeline::PipelineSettings;
    use crate::storage::InMemoryStore;

    fn settings() -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy {
                max_attempts: 4,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(4),
            },
            ..PipelineSettings::default()
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new(default_table_schema().with_table_name("test")).with_page_size(7)
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "Receipt ID": format!("R{}", i / 3),
                    "Date": "2024-03-0".to_string() + &((i % 2) + 1).to_string(),
                    "Amount": i,
                }))
                .unwrap()
            })
            .collect()
    }

    fn context() -> ImportContext {
        ImportContext::new(Uuid::new_v4(), Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_load_writes_every_record() {
        let store = store();
        let pipeline = Pipeline::new(&store, settings());

        let summary = load(&pipeline, records(60), &context()).await.unwrap();

        assert_eq!(summary.operation, LOAD);
        assert_eq!(summary.counter.requests_applied, 60);
        assert_eq!(store.len().await, 60);

        let row = store
            .get(&PrimaryKey::new("RECEIPT#R0", "LINE#000002"))
            .await
            .unwrap();
        assert_eq!(
            row.index_key,
            Some(IndexKey::new("DATE#2024-03-02", "RECEIPT#R0#LINE#000002"))
        );
    }

    #[tokio::test]
    async fn test_load_survives_throttling() {
        let store = store();
        store.withhold_schedule([24, 12, 6]).await;
        let pipeline = Pipeline::new(&store, settings());

        let summary = load(&pipeline, records(30), &context()).await.unwrap();

        assert_eq!(store.len().await, 30);
        assert_eq!(summary.counter.retries, 3);
    }

    #[tokio::test]
    async fn test_purge_is_idempotent() {
        let store = store();
        let pipeline = Pipeline::new(&store, settings());
        load(&pipeline, records(40), &context()).await.unwrap();

        let first = purge(&pipeline, &ScanRequest::full_scan()).await.unwrap();
        assert_eq!(first.counter.requests_applied, 40);
        assert!(store.is_empty().await);

        let second = purge(&pipeline, &ScanRequest::full_scan()).await.unwrap();
        assert_eq!(second.counter.requests_applied, 0);
        assert_eq!(second.counter.chunks_completed, 0);
    }

    #[tokio::test]
    async fn test_scoped_purge_by_partition() {
        let store = store();
        let pipeline = Pipeline::new(&store, settings());
        load(&pipeline, records(9), &context()).await.unwrap();

        let request = ScanRequest::full_scan().with_partition("RECEIPT#R1");
        let summary = purge(&pipeline, &request).await.unwrap();

        assert_eq!(summary.counter.requests_applied, 3);
        assert_eq!(store.len().await, 6);
    }

    #[tokio::test]
    async fn test_scoped_purge_through_index() {
        let store = store();
        let pipeline = Pipeline::new(&store, settings());
        load(&pipeline, records(10), &context()).await.unwrap();

        let request = ScanRequest::full_scan()
            .with_index("GSI1")
            .with_partition("DATE#2024-03-01");
        purge(&pipeline, &request).await.unwrap();

        assert_eq!(store.len().await, 5);
        assert!(store
            .get(&PrimaryKey::new("RECEIPT#R0", "LINE#000002"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_dry_run_count_matches_purge() {
        let store = store();
        let pipeline = Pipeline::new(&store, settings());
        load(&pipeline, records(17), &context()).await.unwrap();

        let request = ScanRequest::full_scan();
        assert_eq!(cursor::count_rows(&store, &request).await.unwrap(), 17);
        assert_eq!(store.len().await, 17);
    }

    #[test]
    fn test_preview_takes_first_rows() {
        let items = preview(&records(10), 3);

        assert_eq!(items.len(), 3);
        assert_eq!(items[2].line_number(), 3);
        assert_eq!(items[0].receipt_id.as_deref(), Some("R0"));
    }
}
